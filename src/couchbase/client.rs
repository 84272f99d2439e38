// src/couchbase/client.rs
use super::info::{BucketInfo, BucketPayload, ClusterInfo, PoolPayload};
use crate::config::ConnectionConfig;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid cluster URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Cluster returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response payload: {0}")]
    Decode(String),
}

/// Operations the health probe needs from a connected cluster handle.
///
/// `cluster_info` must be cheap: implementations answer it from metadata they
/// already hold. `bucket_info` goes to the network.
#[async_trait]
pub trait CouchbaseOperations: Send + Sync {
    fn cluster_info(&self) -> ClusterInfo;

    async fn bucket_info(&self) -> Result<BucketInfo, ClientError>;
}

/// Client for the cluster REST management API, bound to a single bucket.
pub struct CouchbaseClient {
    inner: reqwest::Client,
    base_url: Url,
    bucket: String,
    credentials: Option<(String, Option<String>)>,
    cluster: ArcSwap<ClusterInfo>,
}

impl CouchbaseClient {
    /// Build the client and load the initial cluster metadata.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        let client = Self {
            inner,
            base_url: config.url.clone(),
            bucket: config.bucket.clone(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
            cluster: ArcSwap::from_pointee(ClusterInfo::default()),
        };

        client.refresh_cluster_info().await?;

        info!(
            "Connected to cluster at {} (bucket: {}, versions: {:?})",
            client.base_url,
            client.bucket,
            client.cluster.load().all_versions()
        );

        Ok(client)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Re-read `/pools/default` and replace the cached cluster snapshot.
    pub async fn refresh_cluster_info(&self) -> Result<ClusterInfo, ClientError> {
        let pool: PoolPayload = self.get(&["pools", "default"]).await?;
        let info = ClusterInfo::from_pool(pool);
        self.cluster.store(std::sync::Arc::new(info.clone()));
        debug!("Cluster info refreshed: {:?}", info.all_versions());
        Ok(info)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = endpoint(&self.base_url, segments)?;
        let mut request = self.inner.get(url);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CouchbaseOperations for CouchbaseClient {
    fn cluster_info(&self) -> ClusterInfo {
        self.cluster.load().as_ref().clone()
    }

    async fn bucket_info(&self) -> Result<BucketInfo, ClientError> {
        let payload: BucketPayload = self
            .get(&["pools", "default", "buckets", &self.bucket])
            .await?;
        Ok(BucketInfo::from_payload(payload))
    }
}

/// Appends percent-encoded `segments` to whatever path `base` already has.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut full = base.clone();
    full.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(full)
}

impl std::fmt::Debug for CouchbaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouchbaseClient")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .finish()
    }
}
