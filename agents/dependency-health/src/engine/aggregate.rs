//! Health entry aggregation
//!
//! Folds one window of dependency observations into per-component entries.

use std::collections::BTreeSet;

use crate::contracts::*;
use crate::engine::registry::ComponentRegistry;

/// Failure rate (percent) above which a component takes its configured severity
pub const DEFAULT_FAILED_RATE_THRESHOLD: f64 = 10.0;

/// Routable part of a dependency target: text before the first `|`, trimmed
pub fn routable_target(target: &str) -> &str {
    target
        .split_once('|')
        .map_or(target, |(head, _)| head)
        .trim()
}

/// Builds health entries from a single telemetry window
#[derive(Debug, Clone, Copy)]
pub struct HealthEntryAggregator {
    threshold: f64,
}

impl Default for HealthEntryAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FAILED_RATE_THRESHOLD)
    }
}

impl HealthEntryAggregator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Aggregate rows into entries keyed by component display name.
    ///
    /// Rows matching no registry entry are dropped. Status is recomputed
    /// from the cumulative rate after every folded row.
    pub fn aggregate(
        &self,
        rows: &[DependencyObservation],
        registry: &ComponentRegistry,
    ) -> HealthEntries {
        rows.iter().fold(HealthEntries::new(), |mut entries, row| {
            let target = routable_target(&row.target);
            let Some(component) = registry.match_target(target) else {
                tracing::debug!(
                    dependency_target = target,
                    "Dependency target outside the critical set"
                );
                return entries;
            };

            let entry = entries
                .entry(component.name.clone())
                .and_modify(|entry| absorb(entry, row))
                .or_insert_with(|| first_entry(&component.match_key, row));
            entry.status = self.status_for(entry, component.severity);

            entries
        })
    }

    /// Configured severity when the failure rate exceeds the threshold
    pub fn status_for(&self, entry: &HealthEntry, severity: ComponentSeverity) -> HealthStatus {
        if entry.failed_rate() > self.threshold {
            severity.into()
        } else {
            HealthStatus::Healthy
        }
    }
}

fn first_entry(match_key: &str, row: &DependencyObservation) -> HealthEntry {
    HealthEntry {
        description: match_key.to_string(),
        tags: BTreeSet::from([row.dependency_type.clone()]),
        duration: row.avg_duration(),
        total: row.total_count,
        failed: row.failed_count,
        status: HealthStatus::Healthy,
    }
}

fn absorb(entry: &mut HealthEntry, row: &DependencyObservation) {
    entry.tags.insert(row.dependency_type.clone());
    entry.total = entry.total.saturating_add(row.total_count);
    entry.failed = entry.failed.saturating_add(row.failed_count);
    // Informational only: the latest row's average wins
    entry.duration = row.avg_duration();
}
