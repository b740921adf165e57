//! Error types for report construction
//!
//! Any of these fails the whole report request; no partial report is built.

use thiserror::Error;

use crate::contracts::RowParseError;
use crate::query::QueryError;

/// Main error type for health report operations
#[derive(Error, Debug)]
pub enum HealthReportError {
    /// No monitored instance is configured for the requested name
    #[error("Unknown instance: {0}")]
    UnknownInstance(String),

    /// More than one monitored instance matches the requested name
    #[error("Ambiguous instance: {name} matches {matches} configured endpoints")]
    AmbiguousInstance { name: String, matches: usize },

    /// A telemetry row carried a non-numeric value
    #[error("Parse error: {0}")]
    Parse(#[from] RowParseError),

    /// The telemetry query failed
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

impl HealthReportError {
    /// Short label for metrics and API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            HealthReportError::UnknownInstance(_) => "UnknownInstance",
            HealthReportError::AmbiguousInstance { .. } => "AmbiguousInstance",
            HealthReportError::Parse(_) => "ParseError",
            HealthReportError::Query(_) => "QueryError",
        }
    }

    /// Check if this is a configuration fault
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            HealthReportError::UnknownInstance(_) | HealthReportError::AmbiguousInstance { .. }
        )
    }
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, HealthReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HealthReportError::UnknownInstance("orders-api".to_string());
        assert_eq!(err.to_string(), "Unknown instance: orders-api");

        let err = HealthReportError::AmbiguousInstance {
            name: "api".to_string(),
            matches: 2,
        };
        assert_eq!(err.to_string(), "Ambiguous instance: api matches 2 configured endpoints");
    }

    #[test]
    fn test_error_classification() {
        assert!(HealthReportError::UnknownInstance("x".to_string()).is_config_error());

        let query = HealthReportError::from(QueryError::EmptyResult);
        assert!(!query.is_config_error());
        assert_eq!(query.kind(), "QueryError");
    }
}
