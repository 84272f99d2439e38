// src/health/indicator.rs
use super::{Health, HealthError};
use async_trait::async_trait;
use tracing::warn;

/// A component that can report its own health.
///
/// Implementors only provide [`check`](HealthIndicator::check) and let
/// failures propagate. [`health`](HealthIndicator::health) is what callers
/// use: it turns any propagated failure into a DOWN report.
#[async_trait]
pub trait HealthIndicator: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> Result<Health, HealthError>;

    async fn health(&self) -> Health {
        match self.check().await {
            Ok(health) => health,
            Err(e) => {
                warn!("{} health check failed: {}", self.name(), e);
                Health::down(&e)
            }
        }
    }
}
