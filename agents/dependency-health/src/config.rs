//! Agent configuration
//!
//! Loaded once at startup from JSON, YAML or TOML (by file extension),
//! validated, then turned into the per-instance component registries.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::contracts::CriticalComponent;
use crate::engine::aggregate::DEFAULT_FAILED_RATE_THRESHOLD;
use crate::engine::registry::{ComponentRegistry, InstanceCatalog, MonitoredInstance};
use crate::engine::resolve::StatusPrecedence;
use crate::query::log_analytics::{DEFAULT_ENDPOINT, DEFAULT_TOKEN_ENV};

/// Dependency health agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Log Analytics workspace identifier
    #[serde(default)]
    pub workspace_id: String,

    /// Query API base URL
    #[serde(default = "default_query_endpoint")]
    pub query_endpoint: String,

    /// Environment variable holding the query bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Query timeout in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Long window size in seconds
    #[serde(default = "default_baseline_window_secs")]
    pub baseline_window_secs: u64,

    /// Short window size in seconds
    #[serde(default = "default_recent_window_secs")]
    pub recent_window_secs: u64,

    /// Failure rate percentage above which a component breaches
    #[serde(default = "default_failed_rate_threshold")]
    pub failed_rate_threshold: f64,

    /// Overall status precedence policy
    #[serde(default)]
    pub status_precedence: StatusPrecedence,

    /// Monitored instances
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

fn default_query_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_query_timeout_ms() -> u64 {
    30_000
}

fn default_baseline_window_secs() -> u64 {
    4 * 60 * 60
}

fn default_recent_window_secs() -> u64 {
    15 * 60
}

fn default_failed_rate_threshold() -> f64 {
    DEFAULT_FAILED_RATE_THRESHOLD
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            workspace_id: String::new(),
            query_endpoint: default_query_endpoint(),
            token_env: default_token_env(),
            query_timeout_ms: default_query_timeout_ms(),
            baseline_window_secs: default_baseline_window_secs(),
            recent_window_secs: default_recent_window_secs(),
            failed_rate_threshold: default_failed_rate_threshold(),
            status_precedence: StatusPrecedence::default(),
            instances: Vec::new(),
        }
    }
}

impl AgentConfig {
    pub fn baseline_window(&self) -> Duration {
        Duration::from_secs(self.baseline_window_secs)
    }

    pub fn recent_window(&self) -> Duration {
        Duration::from_secs(self.recent_window_secs)
    }

    /// Build the read-only registries for every configured instance
    pub fn catalog(&self) -> InstanceCatalog {
        InstanceCatalog::new(
            self.instances
                .iter()
                .map(|instance| MonitoredInstance {
                    name: instance.name.clone(),
                    uri: instance.uri.clone(),
                    registry: ComponentRegistry::new(instance.components.clone()),
                })
                .collect(),
        )
    }
}

/// A monitored service instance and its critical components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Human-readable name
    pub name: String,

    /// Health endpoint URI; requests are matched against its suffix
    pub uri: String,

    /// Critical components in match priority order
    #[serde(default)]
    pub components: Vec<CriticalComponent>,
}

/// Semantic configuration problem
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from disk.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let content = fs::read_to_string(path)?;

    let config: AgentConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("YAML error: {}", e)))?,
        Some("toml") => {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(format!("TOML error: {}", e)))?
        }
        _ => serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("JSON error: {}", e)))?,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Semantic checks that serde cannot express
pub fn validate_config(config: &AgentConfig) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if config.instances.is_empty() {
        issues.push(ValidationIssue::new("instances", "at least one instance is required"));
    }
    if config.baseline_window_secs == 0 {
        issues.push(ValidationIssue::new("baseline_window_secs", "must be greater than 0"));
    }
    if config.recent_window_secs == 0 {
        issues.push(ValidationIssue::new("recent_window_secs", "must be greater than 0"));
    }
    if !(0.0..=100.0).contains(&config.failed_rate_threshold) {
        issues.push(ValidationIssue::new(
            "failed_rate_threshold",
            "must be a percentage between 0 and 100",
        ));
    }

    for (i, instance) in config.instances.iter().enumerate() {
        let prefix = format!("instances[{}]", i);

        if instance.uri.trim().is_empty() {
            issues.push(ValidationIssue::new(format!("{}.uri", prefix), "must not be empty"));
        }

        // Several match keys may share one display name; keys themselves are unique
        let mut keys = HashSet::new();
        for (j, component) in instance.components.iter().enumerate() {
            let field = format!("{}.components[{}]", prefix, j);
            if component.match_key.is_empty() {
                issues.push(ValidationIssue::new(
                    format!("{}.match_key", field),
                    "must not be empty",
                ));
            } else if !keys.insert(component.match_key.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("{}.match_key", field),
                    format!("duplicate match key '{}'", component.match_key),
                ));
            }
            if component.name.trim().is_empty() {
                issues.push(ValidationIssue::new(format!("{}.name", field), "must not be empty"));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ComponentSeverity, DependencyObservation};
    use crate::engine::HealthEntryAggregator;

    fn instance(components: Vec<CriticalComponent>) -> InstanceConfig {
        InstanceConfig {
            name: "Orders".to_string(),
            uri: "https://orders.example.com/health/orders-api".to_string(),
            components,
        }
    }

    #[test]
    fn test_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"instances": []}"#).unwrap();
        assert_eq!(config.baseline_window(), Duration::from_secs(14_400));
        assert_eq!(config.recent_window(), Duration::from_secs(900));
        assert_eq!(config.failed_rate_threshold, 10.0);
        assert_eq!(config.status_precedence, StatusPrecedence::Observed);
        assert_eq!(config.token_env, "LOG_ANALYTICS_TOKEN");
    }

    #[test]
    fn test_valid_config() {
        let config = AgentConfig {
            instances: vec![instance(vec![CriticalComponent::new(
                "database.windows.net",
                "SQL",
                ComponentSeverity::Unhealthy,
            )])],
            ..AgentConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_issues() {
        let config = AgentConfig {
            recent_window_secs: 0,
            failed_rate_threshold: 150.0,
            instances: vec![instance(vec![
                CriticalComponent::new("", "SQL", ComponentSeverity::Unhealthy),
                CriticalComponent::new("vault.azure.net", " ", ComponentSeverity::Degraded),
                CriticalComponent::new("vault.azure.net", "Vault", ComponentSeverity::Degraded),
            ])],
            ..AgentConfig::default()
        };

        let issues = validate_config(&config).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "recent_window_secs",
                "failed_rate_threshold",
                "instances[0].components[0].match_key",
                "instances[0].components[1].name",
                "instances[0].components[2].match_key",
            ]
        );
    }

    #[test]
    fn test_match_keys_may_share_display_name() {
        let config = AgentConfig {
            instances: vec![instance(vec![
                CriticalComponent::new(
                    "queue.core.windows.net",
                    "Storage",
                    ComponentSeverity::Degraded,
                ),
                CriticalComponent::new(
                    "blob.core.windows.net",
                    "Storage",
                    ComponentSeverity::Degraded,
                ),
            ])],
            ..AgentConfig::default()
        };
        assert!(validate_config(&config).is_ok());

        let rows = vec![
            DependencyObservation::new("acct.queue.core.windows.net", "Queue", 4.0, 12, 0),
            DependencyObservation::new("acct.blob.core.windows.net", "Blob", 6.0, 8, 1),
        ];
        let catalog = config.catalog();
        let registry = &catalog.resolve("orders-api").unwrap().registry;
        let entries = HealthEntryAggregator::default().aggregate(&rows, registry);

        assert_eq!(entries.len(), 1);
        let storage = &entries["Storage"];
        assert_eq!(storage.total, 20);
        assert_eq!(storage.failed, 1);
        assert_eq!(storage.description, "queue.core.windows.net");
        assert!(storage.tags.contains("Queue") && storage.tags.contains("Blob"));
    }

    #[test]
    fn test_empty_instances_rejected() {
        let issues = validate_config(&AgentConfig::default()).unwrap_err();
        assert_eq!(issues[0].field, "instances");
    }

    #[test]
    fn test_catalog_preserves_component_order() {
        let config = AgentConfig {
            instances: vec![instance(vec![
                CriticalComponent::new("core.windows.net", "Storage", ComponentSeverity::Degraded),
                CriticalComponent::new(
                    "queue.core.windows.net",
                    "Queue",
                    ComponentSeverity::Degraded,
                ),
            ])],
            ..AgentConfig::default()
        };

        let catalog = config.catalog();
        let registry = &catalog.resolve("orders-api").unwrap().registry;
        assert_eq!(registry.components()[0].name, "Storage");
        assert_eq!(registry.len(), 2);
    }
}
