//! Telemetry query collaborator
//!
//! The engine asks a [`TelemetryQuery`] for one result table per window and
//! parses the rows itself. Implementations:
//! - `log_analytics` - Log Analytics workspace query API
//! - `fixture` - in-memory tables for tests and offline evaluation

pub mod fixture;
pub mod log_analytics;

pub use fixture::StaticTelemetry;
pub use log_analytics::LogAnalyticsQuery;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::contracts::{DependencyObservation, RowParseError};

/// Which of the two report windows a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Long window establishing the trend
    Baseline,
    /// Short near-real-time window
    Recent,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Recent => "recent",
        }
    }
}

/// Time range of a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub kind: WindowKind,
    pub span: Duration,
}

impl QueryWindow {
    pub fn baseline(span: Duration) -> Self {
        Self {
            kind: WindowKind::Baseline,
            span,
        }
    }

    pub fn recent(span: Duration) -> Self {
        Self {
            kind: WindowKind::Recent,
            span,
        }
    }

    /// ISO-8601 duration ending now, e.g. `PT900S`
    pub fn iso8601(&self) -> String {
        format!("PT{}S", self.span.as_secs())
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.kind.as_str(), self.span.as_secs())
    }
}

/// Result column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
}

/// Raw tabular query result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<QueryColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryTable {
    pub fn from_rows(rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            name: "PrimaryResult".to_string(),
            columns: Vec::new(),
            rows,
        }
    }

    /// Parse every row; the first malformed row aborts the whole table.
    pub fn observations(&self) -> Result<Vec<DependencyObservation>, RowParseError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| DependencyObservation::from_row(index, cells))
            .collect()
    }
}

/// Source of dependency telemetry
#[async_trait]
pub trait TelemetryQuery: Send + Sync {
    /// Query source identifier
    fn id(&self) -> &str;

    /// Fetch the dependency-graph table for `instance_name` over `window`
    async fn query(&self, instance_name: &str, window: QueryWindow)
        -> Result<QueryTable, QueryError>;
}

/// Query errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Query returned no result table")]
    EmptyResult,

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_window_iso8601() {
        assert_eq!(QueryWindow::baseline(Duration::from_secs(4 * 3600)).iso8601(), "PT14400S");
        assert_eq!(QueryWindow::recent(Duration::from_secs(900)).iso8601(), "PT900S");
    }

    #[test]
    fn test_observations_abort_on_bad_row() {
        let table = QueryTable::from_rows(vec![
            vec![json!("a"), json!("HTTP"), json!(1.0), json!(1), json!(0)],
            vec![json!("b"), json!("HTTP"), json!("slow"), json!(1), json!(0)],
        ]);

        let err = table.observations().unwrap_err();
        assert!(matches!(
            err,
            RowParseError::InvalidValue {
                row: 1,
                column: "avg_DurationMs",
                ..
            }
        ));
    }

    #[test]
    fn test_table_deserializes_log_analytics_shape() {
        let table: QueryTable = serde_json::from_value(json!({
            "name": "PrimaryResult",
            "columns": [{"name": "Target", "type": "string"}],
            "rows": [["a", "HTTP", 1.5, "3", "0"]]
        }))
        .unwrap();

        assert_eq!(table.columns[0].column_type, "string");
        assert_eq!(table.observations().unwrap()[0].total_count, 3);
    }
}
