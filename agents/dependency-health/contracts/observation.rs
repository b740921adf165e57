//! Dependency telemetry rows
//!
//! One observation per `(target, dependency type)` pair returned by the
//! dependency-graph query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Column order of the dependency-graph query result
pub const OBSERVATION_COLUMNS: [&str; 5] =
    ["Target", "DependencyType", "avg_DurationMs", "total", "failed"];

/// Aggregated dependency calls for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyObservation {
    pub target: String,
    pub dependency_type: String,
    pub avg_duration_ms: f64,
    pub total_count: u64,
    pub failed_count: u64,
}

impl DependencyObservation {
    pub fn new(
        target: impl Into<String>,
        dependency_type: impl Into<String>,
        avg_duration_ms: f64,
        total_count: u64,
        failed_count: u64,
    ) -> Self {
        Self {
            target: target.into(),
            dependency_type: dependency_type.into(),
            avg_duration_ms,
            total_count,
            failed_count,
        }
    }

    /// Average latency rounded to the nanosecond.
    ///
    /// Negative and NaN averages saturate to zero.
    pub fn avg_duration(&self) -> Duration {
        Duration::from_nanos((self.avg_duration_ms * 1_000_000.0).round() as u64)
    }

    /// Parse a raw query row.
    ///
    /// Numeric cells may be JSON numbers or numeric strings. A null failed
    /// count means no failures were recorded; every other unparseable
    /// value is rejected.
    pub fn from_row(row: usize, cells: &[Value]) -> Result<Self, RowParseError> {
        if cells.len() < OBSERVATION_COLUMNS.len() {
            return Err(RowParseError::ColumnCount {
                row,
                expected: OBSERVATION_COLUMNS.len(),
                found: cells.len(),
            });
        }

        let avg_duration_ms = parse_f64(&cells[2])
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .ok_or_else(|| RowParseError::invalid(row, OBSERVATION_COLUMNS[2], &cells[2]))?;

        let total_count = parse_count(&cells[3])
            .ok_or_else(|| RowParseError::invalid(row, OBSERVATION_COLUMNS[3], &cells[3]))?;

        let failed_count = match &cells[4] {
            Value::Null => 0,
            cell => parse_count(cell)
                .ok_or_else(|| RowParseError::invalid(row, OBSERVATION_COLUMNS[4], cell))?,
        };

        Ok(Self {
            target: parse_text(&cells[0])
                .ok_or_else(|| RowParseError::invalid(row, OBSERVATION_COLUMNS[0], &cells[0]))?,
            dependency_type: parse_text(&cells[1])
                .ok_or_else(|| RowParseError::invalid(row, OBSERVATION_COLUMNS[1], &cells[1]))?,
            avg_duration_ms,
            total_count,
            failed_count,
        })
    }
}

fn parse_text(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn parse_f64(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_count(cell: &Value) -> Option<u64> {
    if let Value::Number(n) = cell {
        if let Some(count) = n.as_u64() {
            return Some(count);
        }
    }
    if let Value::String(s) = cell {
        if let Ok(count) = s.trim().parse::<u64>() {
            return Some(count);
        }
    }
    // Decimal columns may carry an integral value with a fraction part ("100.0")
    parse_f64(cell)
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
        .map(|v| v as u64)
}

/// Malformed telemetry row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowParseError {
    #[error("row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: invalid {column} value {value}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

impl RowParseError {
    fn invalid(row: usize, column: &'static str, value: &Value) -> Self {
        RowParseError::InvalidValue {
            row,
            column,
            value: value.to_string(),
        }
    }
}
