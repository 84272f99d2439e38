// src/health/registry.rs
use super::{Health, HealthIndicator, HealthStatus};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("a health indicator named '{0}' is already registered")]
    Duplicate(String),
}

/// Overall status plus the report of every registered component.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Health>,
}

#[derive(Clone, Default)]
pub struct HealthRegistry {
    indicators: Arc<DashMap<String, Arc<dyn HealthIndicator>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        indicator: Arc<dyn HealthIndicator>,
    ) -> Result<(), RegistryError> {
        use dashmap::mapref::entry::Entry;

        let name = name.into();
        match self.indicators.entry(name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(name)),
            Entry::Vacant(slot) => {
                slot.insert(indicator);
                info!("Registered health indicator: {}", name);
                Ok(())
            }
        }
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<dyn HealthIndicator>> {
        self.indicators.remove(name).map(|(_, indicator)| indicator)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn HealthIndicator>> {
        self.indicators.get(name).map(|entry| entry.value().clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .indicators
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub async fn health_of(&self, name: &str) -> Option<Health> {
        let indicator = self.get(name)?;
        Some(indicator.health().await)
    }

    pub async fn aggregate(&self) -> CompositeHealth {
        // Snapshot first so no map guard is held across an await.
        let indicators: Vec<(String, Arc<dyn HealthIndicator>)> = self
            .indicators
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let reports = futures::future::join_all(indicators.into_iter().map(
            |(name, indicator)| async move { (name, indicator.health().await) },
        ))
        .await;

        let components: BTreeMap<String, Health> = reports.into_iter().collect();
        let status = HealthStatus::aggregate(components.values().map(Health::status));

        debug!(
            "Aggregated {} health indicators: {}",
            components.len(),
            status
        );

        CompositeHealth { status, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Static {
        name: &'static str,
        status: Option<HealthStatus>,
    }

    #[async_trait]
    impl HealthIndicator for Static {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> Result<Health, HealthError> {
            match self.status {
                Some(status) => Ok(Health::builder().status(status).build()),
                None => Err(HealthError::Timeout(Duration::from_millis(10))),
            }
        }
    }

    fn indicator(name: &'static str, status: Option<HealthStatus>) -> Arc<dyn HealthIndicator> {
        Arc::new(Static { name, status })
    }

    #[tokio::test]
    async fn test_empty_registry_is_unknown() {
        let registry = HealthRegistry::new();
        let composite = registry.aggregate().await;
        assert_eq!(composite.status, HealthStatus::Unknown);
        assert!(composite.components.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_reports_most_severe() {
        let registry = HealthRegistry::new();
        registry
            .register("db", indicator("db", Some(HealthStatus::Up)))
            .unwrap();
        registry
            .register("cache", indicator("cache", None))
            .unwrap();

        let composite = registry.aggregate().await;
        assert_eq!(composite.status, HealthStatus::Down);
        assert_eq!(composite.components["db"].status(), HealthStatus::Up);
        assert_eq!(composite.components["cache"].status(), HealthStatus::Down);
        assert!(composite.components["cache"].detail("error").is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let registry = HealthRegistry::new();
        registry
            .register("db", indicator("db", Some(HealthStatus::Up)))
            .unwrap();

        let err = registry
            .register("db", indicator("db", Some(HealthStatus::Down)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(ref name) if name == "db"));

        // first registration wins
        let health = registry.health_of("db").await.unwrap();
        assert_eq!(health.status(), HealthStatus::Up);
    }

    #[tokio::test]
    async fn test_unregister_and_lookup() {
        let registry = HealthRegistry::new();
        registry
            .register("b", indicator("b", Some(HealthStatus::Up)))
            .unwrap();
        registry
            .register("a", indicator("a", Some(HealthStatus::Up)))
            .unwrap();
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);

        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
        assert!(registry.health_of("a").await.is_none());
        assert_eq!(registry.len(), 1);
    }
}
