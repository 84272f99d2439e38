// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couchbase.bucket must not be empty")]
    EmptyBucket,

    #[error("couchbase.url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("server.path must start with '/', got '{0}'")]
    InvalidPath(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub couchbase: ConnectionConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.couchbase.validate()?;

        if self.health.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("health.timeout_ms"));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.server.path.clone()));
        }

        Ok(())
    }
}

/// Where the cluster lives and which bucket the probe is bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub url: Url,
    pub bucket: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl ConnectionConfig {
    pub fn new(url: Url, bucket: impl Into<String>) -> Self {
        Self {
            url,
            bucket: bucket.into(),
            username: None,
            password: None,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::EmptyBucket);
        }

        match self.url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("couchbase.connect_timeout_ms"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_timeout_ms")]
    pub timeout_ms: u64,
}

impl HealthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_health_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_health_timeout_ms() -> u64 {
    1000
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_path() -> String {
    "/health".to_string()
}
