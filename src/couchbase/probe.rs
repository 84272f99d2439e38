// src/couchbase/probe.rs
use super::client::CouchbaseOperations;
use crate::health::{Health, HealthError, HealthIndicator};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// Reports the versions running in the cluster and the nodes serving the
/// bound bucket.
///
/// Only the bucket lookup is bounded by `timeout`; cluster info comes from
/// metadata the client already holds. Failures are returned as-is and turned
/// into DOWN by [`HealthIndicator::health`].
pub struct CouchbaseHealthProbe<O: ?Sized = dyn CouchbaseOperations> {
    operations: Arc<O>,
    timeout: Duration,
}

impl<O> CouchbaseHealthProbe<O>
where
    O: CouchbaseOperations + ?Sized,
{
    pub fn new(operations: Arc<O>, timeout: Duration) -> Self {
        Self {
            operations,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn check(&self) -> Result<Health, HealthError> {
        let start = Instant::now();

        let cluster = self.operations.cluster_info();
        let versions = cluster.all_versions().join(",");

        let bucket = timeout(self.timeout, self.operations.bucket_info())
            .await
            .map_err(|_| HealthError::Timeout(self.timeout))??;
        let nodes = bucket.node_list().join(",");

        debug!(
            "Couchbase health check took {:?} (versions: {}, nodes: {})",
            start.elapsed(),
            versions,
            nodes
        );

        Ok(Health::up()
            .with_detail("versions", versions)
            .with_detail("nodes", nodes)
            .build())
    }
}

#[async_trait]
impl<O> HealthIndicator for CouchbaseHealthProbe<O>
where
    O: CouchbaseOperations + ?Sized,
{
    fn name(&self) -> &str {
        "couchbase"
    }

    async fn check(&self) -> Result<Health, HealthError> {
        CouchbaseHealthProbe::check(self).await
    }
}
