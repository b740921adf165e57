//! Overall status resolution
//!
//! The overall status is the first status in the precedence order that any
//! entry carries, or `Healthy` when none does.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::contracts::*;

/// Order in which non-healthy statuses claim the overall status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPrecedence {
    /// `Degraded` before `Unhealthy`, as the dashboard contract reports it
    #[default]
    Observed,
    /// `Unhealthy` before `Degraded`
    SeverityRanked,
}

impl StatusPrecedence {
    pub fn order(&self) -> [HealthStatus; 2] {
        match self {
            Self::Observed => [HealthStatus::Degraded, HealthStatus::Unhealthy],
            Self::SeverityRanked => [HealthStatus::Unhealthy, HealthStatus::Degraded],
        }
    }

    pub fn resolve(&self, entries: &HealthEntries) -> HealthStatus {
        self.order()
            .into_iter()
            .find(|status| entries.values().any(|e| e.status == *status))
            .unwrap_or(HealthStatus::Healthy)
    }
}

impl fmt::Display for StatusPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observed => write!(f, "observed"),
            Self::SeverityRanked => write!(f, "severity_ranked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn entries(statuses: &[(&str, HealthStatus)]) -> HealthEntries {
        statuses
            .iter()
            .map(|(name, status)| {
                (
                    name.to_string(),
                    HealthEntry {
                        description: name.to_lowercase(),
                        tags: BTreeSet::new(),
                        duration: Duration::ZERO,
                        total: 1,
                        failed: 0,
                        status: *status,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_is_healthy() {
        assert_eq!(
            StatusPrecedence::Observed.resolve(&HealthEntries::new()),
            HealthStatus::Healthy
        );
    }

    #[test]
    fn test_unhealthy_over_healthy() {
        let e = entries(&[("A", HealthStatus::Healthy), ("B", HealthStatus::Unhealthy)]);
        assert_eq!(StatusPrecedence::Observed.resolve(&e), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_observed_ranks_degraded_first() {
        let e = entries(&[("A", HealthStatus::Degraded), ("B", HealthStatus::Unhealthy)]);
        assert_eq!(StatusPrecedence::Observed.resolve(&e), HealthStatus::Degraded);
    }

    #[test]
    fn test_severity_ranked_policy() {
        let e = entries(&[("A", HealthStatus::Degraded), ("B", HealthStatus::Unhealthy)]);
        assert_eq!(StatusPrecedence::SeverityRanked.resolve(&e), HealthStatus::Unhealthy);

        let degraded_only = entries(&[("A", HealthStatus::Degraded), ("B", HealthStatus::Healthy)]);
        assert_eq!(
            StatusPrecedence::SeverityRanked.resolve(&degraded_only),
            HealthStatus::Degraded
        );
    }

    #[test]
    fn test_policy_deserializes_from_config() {
        let policy: StatusPrecedence = serde_json::from_str("\"severity_ranked\"").unwrap();
        assert_eq!(policy, StatusPrecedence::SeverityRanked);
        assert_eq!(StatusPrecedence::default(), StatusPrecedence::Observed);
    }
}
