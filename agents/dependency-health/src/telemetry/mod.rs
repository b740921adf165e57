//! Telemetry for the Dependency Health Agent
//!
//! - `metrics` - Prometheus metrics for report requests

pub mod metrics;

pub use metrics::ReportMetrics;

use thiserror::Error;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
