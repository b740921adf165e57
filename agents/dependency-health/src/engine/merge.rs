//! Baseline/recent window merge

use crate::contracts::*;

/// Combine the baseline and recent windows.
///
/// Every component present in `recent` replaces the baseline entry
/// wholesale; baseline-only components are kept as they are.
pub fn merge_windows(baseline: &HealthEntries, recent: &HealthEntries) -> HealthEntries {
    let mut merged = baseline.clone();
    for (name, entry) in recent {
        if merged.insert(name.clone(), entry.clone()).is_some() {
            tracing::debug!(
                component = %name,
                status = %entry.status,
                "Recent window overrides baseline"
            );
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn entry(total: u64, failed: u64, status: HealthStatus, tag: &str) -> HealthEntry {
        HealthEntry {
            description: "key".to_string(),
            tags: BTreeSet::from([tag.to_string()]),
            duration: Duration::from_millis(5),
            total,
            failed,
            status,
        }
    }

    #[test]
    fn test_recent_overrides_baseline() {
        let baseline = HealthEntries::from([
            ("SQL".to_string(), entry(1000, 10, HealthStatus::Healthy, "SQL")),
            ("Queue".to_string(), entry(500, 0, HealthStatus::Healthy, "Queue")),
        ]);
        let recent = HealthEntries::from([
            ("SQL".to_string(), entry(20, 10, HealthStatus::Unhealthy, "HTTP")),
            ("Vault".to_string(), entry(4, 0, HealthStatus::Healthy, "HTTP")),
        ]);

        let merged = merge_windows(&baseline, &recent);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged["SQL"], recent["SQL"]);
        assert_eq!(merged["Queue"], baseline["Queue"]);
        assert_eq!(merged["Vault"], recent["Vault"]);
    }

    #[test]
    fn test_inputs_untouched() {
        let baseline = HealthEntries::from([(
            "SQL".to_string(),
            entry(1000, 10, HealthStatus::Healthy, "SQL"),
        )]);
        let recent = HealthEntries::from([(
            "SQL".to_string(),
            entry(20, 10, HealthStatus::Unhealthy, "SQL"),
        )]);
        let snapshot = baseline.clone();

        let _ = merge_windows(&baseline, &recent);

        assert_eq!(baseline, snapshot);
    }

    #[test]
    fn test_empty_windows() {
        let populated = HealthEntries::from([(
            "SQL".to_string(),
            entry(1, 0, HealthStatus::Healthy, "SQL"),
        )]);

        assert!(merge_windows(&HealthEntries::new(), &HealthEntries::new()).is_empty());
        assert_eq!(merge_windows(&populated, &HealthEntries::new()), populated);
        assert_eq!(merge_windows(&HealthEntries::new(), &populated), populated);
    }
}
