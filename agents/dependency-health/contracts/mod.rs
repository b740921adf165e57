//! Dependency Health Agent Contracts
//!
//! Wire and domain types shared by the aggregation pipeline, the HTTP
//! handler and the remote client.

mod components;
mod observation;
pub mod timespan;

pub use components::*;
pub use observation::*;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

/// Aggregated entries keyed by component display name
pub type HealthEntries = BTreeMap<String, HealthEntry>;

/// Health status levels
///
/// Serialized in PascalCase so reports can be consumed by the
/// health-checks dashboard unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Fully operational
    Healthy,
    /// Operational with issues
    Degraded,
    /// Not operational
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Degraded => "Degraded",
            Self::Unhealthy => "Unhealthy",
        }
    }

    /// Numeric level used by the status gauge
    pub fn level(&self) -> i64 {
        match self {
            Self::Healthy => 0,
            Self::Degraded => 1,
            Self::Unhealthy => 2,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated health of one critical component within a report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    /// Registry key that matched the dependency target
    pub description: String,

    /// Distinct dependency types observed for the component
    pub tags: BTreeSet<String>,

    /// Average latency reported by the last folded row
    #[serde(with = "timespan")]
    pub duration: Duration,

    /// Total calls
    pub total: u64,

    /// Failed calls
    pub failed: u64,

    /// Component status
    pub status: HealthStatus,
}

impl HealthEntry {
    /// Failed calls as a percentage of total calls.
    ///
    /// A component without observed calls has a rate of 0.
    pub fn failed_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.failed as f64 * 100.0 / self.total as f64
    }
}

impl Serialize for HealthEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HealthEntry", 7)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("duration", &timespan::format(&self.duration))?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("failed", &self.failed)?;
        state.serialize_field("failedRate", &self.failed_rate())?;
        state.serialize_field("description", &self.description)?;
        state.end()
    }
}

/// Point-in-time health report for one monitored instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Overall status
    pub status: HealthStatus,

    /// Per-component entries keyed by display name
    pub entries: HealthEntries,

    /// Instance the report was requested for
    pub instance: String,

    /// Configured name of the instance the request resolved to
    #[serde(default)]
    pub monitored_instance: String,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(instance: impl Into<String>, status: HealthStatus, entries: HealthEntries) -> Self {
        let instance = instance.into();
        Self {
            status,
            entries,
            monitored_instance: instance.clone(),
            instance,
            generated_at: Utc::now(),
        }
    }

    /// Set the configured instance name
    pub fn with_monitored_instance(mut self, name: impl Into<String>) -> Self {
        self.monitored_instance = name.into();
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }

    /// Number of entries with the given status
    pub fn count(&self, status: HealthStatus) -> usize {
        self.entries.values().filter(|e| e.status == status).count()
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} - components={}, degraded={}, unhealthy={}",
            self.instance,
            self.status,
            self.entries.len(),
            self.count(HealthStatus::Degraded),
            self.count(HealthStatus::Unhealthy),
        )
    }
}
