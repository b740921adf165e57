//! Critical component descriptors
//!
//! Defines the dependencies whose health a report tracks.

use serde::{Deserialize, Serialize};

use super::HealthStatus;

/// Status reported when a component breaches the failure threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSeverity {
    #[serde(alias = "Degraded")]
    Degraded,
    #[serde(alias = "Unhealthy")]
    Unhealthy,
}

impl From<ComponentSeverity> for HealthStatus {
    fn from(severity: ComponentSeverity) -> Self {
        match severity {
            ComponentSeverity::Degraded => HealthStatus::Degraded,
            ComponentSeverity::Unhealthy => HealthStatus::Unhealthy,
        }
    }
}

/// A critical dependency matched by substring against telemetry targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalComponent {
    /// Substring searched for within a dependency target
    pub match_key: String,

    /// Display name used as the report entry key
    pub name: String,

    /// Status when the failure rate breaches the threshold
    pub severity: ComponentSeverity,
}

impl CriticalComponent {
    pub fn new(
        match_key: impl Into<String>,
        name: impl Into<String>,
        severity: ComponentSeverity,
    ) -> Self {
        Self {
            match_key: match_key.into(),
            name: name.into(),
            severity,
        }
    }

    /// Whether the routable target contains this component's key
    pub fn matches(&self, target: &str) -> bool {
        target.contains(self.match_key.as_str())
    }
}
