//! Critical component registries
//!
//! One ordered registry per monitored instance, built once from
//! configuration and shared read-only across requests.

use crate::contracts::*;
use crate::error::HealthReportError;

/// Ordered list of critical components; declaration order decides ties.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<CriticalComponent>,
}

impl ComponentRegistry {
    pub fn new(components: Vec<CriticalComponent>) -> Self {
        Self { components }
    }

    /// First component whose key is contained in `target`
    pub fn match_target(&self, target: &str) -> Option<&CriticalComponent> {
        self.components.iter().find(|c| c.matches(target))
    }

    pub fn components(&self) -> &[CriticalComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Registry bound to a monitored instance endpoint
#[derive(Debug, Clone)]
pub struct MonitoredInstance {
    pub name: String,
    pub uri: String,
    pub registry: ComponentRegistry,
}

/// All monitored instances
#[derive(Debug, Clone, Default)]
pub struct InstanceCatalog {
    instances: Vec<MonitoredInstance>,
}

impl InstanceCatalog {
    pub fn new(instances: Vec<MonitoredInstance>) -> Self {
        Self { instances }
    }

    /// Find the single instance whose endpoint URI ends with `instance_name`.
    pub fn resolve(&self, instance_name: &str) -> Result<&MonitoredInstance, HealthReportError> {
        let mut matches = self
            .instances
            .iter()
            .filter(|i| i.uri.ends_with(instance_name));

        let first = matches
            .next()
            .ok_or_else(|| HealthReportError::UnknownInstance(instance_name.to_string()))?;

        let extra = matches.count();
        if extra > 0 {
            return Err(HealthReportError::AmbiguousInstance {
                name: instance_name.to_string(),
                matches: extra + 1,
            });
        }

        Ok(first)
    }

    pub fn instances(&self) -> &[MonitoredInstance] {
        &self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::new(vec![
            CriticalComponent::new(
                "core.windows.net",
                "Azure Storage",
                ComponentSeverity::Degraded,
            ),
            CriticalComponent::new(
                "queue.core.windows.net",
                "Storage Queue",
                ComponentSeverity::Unhealthy,
            ),
            CriticalComponent::new("database.windows.net", "SQL", ComponentSeverity::Unhealthy),
        ])
    }

    fn instance(name: &str, uri: &str) -> MonitoredInstance {
        MonitoredInstance {
            name: name.to_string(),
            uri: uri.to_string(),
            registry: registry(),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let registry = registry();
        let matched = registry.match_target("myacct.queue.core.windows.net").unwrap();
        assert_eq!(matched.name, "Azure Storage");
    }

    #[test]
    fn test_no_match() {
        assert!(registry().match_target("api.stripe.com").is_none());
        assert!(ComponentRegistry::default().match_target("anything").is_none());
    }

    #[test]
    fn test_resolve_by_uri_suffix() {
        let catalog = InstanceCatalog::new(vec![
            instance("Orders", "https://orders.example.com/health/orders-api"),
            instance("Billing", "https://billing.example.com/health/billing-api"),
        ]);

        let found = catalog.resolve("billing-api").unwrap();
        assert_eq!(found.name, "Billing");
    }

    #[test]
    fn test_resolve_unknown_instance() {
        let catalog = InstanceCatalog::new(vec![instance("Orders", "https://x/orders-api")]);
        assert!(matches!(
            catalog.resolve("payments-api"),
            Err(HealthReportError::UnknownInstance(name)) if name == "payments-api"
        ));
    }

    #[test]
    fn test_resolve_ambiguous_instance() {
        let catalog = InstanceCatalog::new(vec![
            instance("Orders EU", "https://eu/orders-api"),
            instance("Orders US", "https://us/orders-api"),
        ]);
        assert!(matches!(
            catalog.resolve("orders-api"),
            Err(HealthReportError::AmbiguousInstance { matches: 2, .. })
        ));
    }
}
