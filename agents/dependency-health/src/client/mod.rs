//! Client for fetching reports from a running Dependency Health Agent
//!
//! Used by the CLI `fetch` command and by other services.

use std::time::Duration;

use crate::contracts::*;
use crate::handler::ApiError;

/// Dependency Health Agent client
pub struct DependencyHealthClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl DependencyHealthClient {
    /// Create new client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the health report for one instance
    pub async fn report(&self, instance_name: &str) -> Result<HealthReport, ClientError> {
        let url = format!("{}/api/HealthCheck", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("instanceName", instance_name)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ClientError::Parse(e.to_string()))
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.message)
                .unwrap_or(error_text);
            Err(ClientError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
}
