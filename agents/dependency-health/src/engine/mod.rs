//! Health report engine
//!
//! Builds one report per request:
//!
//! ```text
//! baseline query ─┐                 ┌─ aggregate ─┐
//!                 ├─ try_join ─ parse              ├─ merge ─ resolve ─ HealthReport
//! recent query ───┘                 └─ aggregate ─┘
//! ```
//!
//! Everything after the two queries is a pure function of their results.

pub mod aggregate;
pub mod merge;
pub mod registry;
pub mod resolve;

pub use aggregate::{routable_target, HealthEntryAggregator, DEFAULT_FAILED_RATE_THRESHOLD};
pub use merge::merge_windows;
pub use registry::{ComponentRegistry, InstanceCatalog, MonitoredInstance};
pub use resolve::StatusPrecedence;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AgentConfig;
use crate::contracts::*;
use crate::error::Result;
use crate::query::{QueryWindow, TelemetryQuery};

/// Window sizes for the two queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    pub baseline: Duration,
    pub recent: Duration,
}

impl Default for ReportWindows {
    fn default() -> Self {
        Self {
            baseline: Duration::from_secs(4 * 60 * 60),
            recent: Duration::from_secs(15 * 60),
        }
    }
}

/// Dependency health report engine
pub struct DependencyHealthEngine {
    query: Arc<dyn TelemetryQuery>,
    catalog: InstanceCatalog,
    aggregator: HealthEntryAggregator,
    windows: ReportWindows,
    precedence: StatusPrecedence,
}

impl DependencyHealthEngine {
    /// Create engine with default threshold, windows and precedence
    pub fn new(query: Arc<dyn TelemetryQuery>, catalog: InstanceCatalog) -> Self {
        Self {
            query,
            catalog,
            aggregator: HealthEntryAggregator::default(),
            windows: ReportWindows::default(),
            precedence: StatusPrecedence::default(),
        }
    }

    /// Create engine from validated configuration
    pub fn from_config(config: &AgentConfig, query: Arc<dyn TelemetryQuery>) -> Self {
        Self::new(query, config.catalog())
            .with_threshold(config.failed_rate_threshold)
            .with_windows(ReportWindows {
                baseline: config.baseline_window(),
                recent: config.recent_window(),
            })
            .with_precedence(config.status_precedence)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.aggregator = HealthEntryAggregator::new(threshold);
        self
    }

    pub fn with_windows(mut self, windows: ReportWindows) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_precedence(mut self, precedence: StatusPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn catalog(&self) -> &InstanceCatalog {
        &self.catalog
    }

    /// Build the health report for one instance.
    ///
    /// Both windows are fetched concurrently; a failure of either, or any
    /// malformed row, fails the whole report.
    pub async fn report(&self, instance_name: &str) -> Result<HealthReport> {
        let start = Instant::now();
        let instance = self.catalog.resolve(instance_name)?;

        let (baseline_table, recent_table) = futures::future::try_join(
            self.query
                .query(instance_name, QueryWindow::baseline(self.windows.baseline)),
            self.query
                .query(instance_name, QueryWindow::recent(self.windows.recent)),
        )
        .await?;

        let baseline_rows = baseline_table.observations()?;
        let recent_rows = recent_table.observations()?;

        let baseline = self.aggregator.aggregate(&baseline_rows, &instance.registry);
        let recent = self.aggregator.aggregate(&recent_rows, &instance.registry);
        let report = self
            .assemble(instance_name, &baseline, &recent)
            .with_monitored_instance(&instance.name);

        tracing::info!(
            instance = instance_name,
            monitored_instance = %instance.name,
            source = self.query.id(),
            baseline_rows = baseline_rows.len(),
            recent_rows = recent_rows.len(),
            components = report.entries.len(),
            status = %report.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Health report built"
        );

        Ok(report)
    }

    /// Merge two aggregated windows and resolve the overall status
    pub fn assemble(
        &self,
        instance_name: &str,
        baseline: &HealthEntries,
        recent: &HealthEntries,
    ) -> HealthReport {
        let entries = merge_windows(baseline, recent);
        let status = self.precedence.resolve(&entries);
        HealthReport::new(instance_name, status, entries)
    }
}
