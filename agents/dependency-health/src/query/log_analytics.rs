//! Log Analytics workspace query client
//!
//! Runs the dependency-graph query against application dependency telemetry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::{QueryError, QueryTable, QueryWindow, TelemetryQuery};
use crate::config::AgentConfig;

pub const DEFAULT_ENDPOINT: &str = "https://api.loganalytics.io";
pub const DEFAULT_TOKEN_ENV: &str = "LOG_ANALYTICS_TOKEN";

/// Totals and failures per `(Target, DependencyType)`, failures coalesced to 0
const DEPENDENCY_GRAPH_QUERY: &str = r#"(AppDependencies
    | where AppRoleName == '{instance}'
    | summarize count(), avg(DurationMs) by Target, AppRoleName, DependencyType)
| join kind=leftouter (AppDependencies
    | where AppRoleName == '{instance}' and Success != true
    | summarize count(), avg(DurationMs) by Target, AppRoleName, DependencyType)
  on Target, AppRoleName, DependencyType
| project
    Target,
    DependencyType,
    avg_DurationMs,
    total = todecimal(count_),
    failed = iff(isnull(count_1), decimal(0), todecimal(count_1))"#;

/// Log Analytics query client
pub struct LogAnalyticsQuery {
    endpoint: String,
    workspace_id: String,
    token: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl LogAnalyticsQuery {
    /// Create new client
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            workspace_id: workspace_id.into(),
            token: None,
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create from configuration, reading the bearer token from the
    /// configured environment variable
    pub fn from_config(config: &AgentConfig) -> Self {
        let token = env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(token_env = %config.token_env, "No Log Analytics token in environment");
        }

        Self {
            endpoint: config.query_endpoint.clone(),
            workspace_id: config.workspace_id.clone(),
            token,
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(config.query_timeout_ms),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Dependency-graph query text for one instance
    pub fn dependency_query(instance_name: &str) -> String {
        let escaped = instance_name.replace('\\', "\\\\").replace('\'', "\\'");
        DEPENDENCY_GRAPH_QUERY.replace("{instance}", &escaped)
    }

    fn query_url(&self) -> String {
        format!(
            "{}/v1/workspaces/{}/query",
            self.endpoint.trim_end_matches('/'),
            self.workspace_id
        )
    }
}

#[async_trait]
impl TelemetryQuery for LogAnalyticsQuery {
    fn id(&self) -> &str {
        "log-analytics"
    }

    async fn query(
        &self,
        instance_name: &str,
        window: QueryWindow,
    ) -> Result<QueryTable, QueryError> {
        let token = self.token.as_deref().ok_or_else(|| {
            QueryError::MissingCredentials("no Log Analytics bearer token configured".to_string())
        })?;

        let request = QueryRequest {
            query: Self::dependency_query(instance_name),
            timespan: window.iso8601(),
        };

        tracing::debug!(instance = instance_name, window = %window, "Querying Log Analytics");

        let response = self
            .client
            .post(self.query_url())
            .bearer_auth(token)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;

        if response.status().is_success() {
            let body: QueryResponse = response
                .json()
                .await
                .map_err(|e| QueryError::Decode(e.to_string()))?;

            body.tables.into_iter().next().ok_or(QueryError::EmptyResult)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(QueryError::Server {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query: String,
    timespan: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    tables: Vec<QueryTable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_embeds_instance() {
        let query = LogAnalyticsQuery::dependency_query("orders-api");
        assert_eq!(query.matches("AppRoleName == 'orders-api'").count(), 2);
        assert!(!query.contains("{instance}"));
    }

    #[test]
    fn test_query_escapes_quotes() {
        let query = LogAnalyticsQuery::dependency_query("x' or 1==1 //");
        assert!(query.contains("AppRoleName == 'x\\' or 1==1 //'"));
    }

    #[test]
    fn test_query_url() {
        let client = LogAnalyticsQuery::new("ws-1").with_endpoint("http://localhost:9000/");
        assert_eq!(client.query_url(), "http://localhost:9000/v1/workspaces/ws-1/query");
    }

    #[tokio::test]
    async fn test_missing_token() {
        let client = LogAnalyticsQuery::new("ws-1");
        let result = client
            .query("orders-api", QueryWindow::recent(Duration::from_secs(900)))
            .await;
        assert!(matches!(result, Err(QueryError::MissingCredentials(_))));
    }
}
