// src/health/report.rs
use super::HealthStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single health report: a status plus free-form string details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    status: HealthStatus,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    details: BTreeMap<String, String>,
}

impl Health {
    pub fn builder() -> HealthBuilder {
        HealthBuilder::default()
    }

    pub fn up() -> HealthBuilder {
        HealthBuilder::default().up()
    }

    pub fn unknown() -> HealthBuilder {
        HealthBuilder::default().unknown()
    }

    /// DOWN report carrying the failure under the `error` detail.
    pub fn down<E>(error: &E) -> Health
    where
        E: ErrorKind + fmt::Display + ?Sized,
    {
        HealthBuilder::default().down_with(error).build()
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

/// Short name of an error's category, used as the prefix of the `error` detail.
pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct HealthBuilder {
    status: HealthStatus,
    details: BTreeMap<String, String>,
}

impl HealthBuilder {
    pub fn status(mut self, status: HealthStatus) -> Self {
        self.status = status;
        self
    }

    pub fn up(self) -> Self {
        self.status(HealthStatus::Up)
    }

    pub fn down(self) -> Self {
        self.status(HealthStatus::Down)
    }

    pub fn unknown(self) -> Self {
        self.status(HealthStatus::Unknown)
    }

    pub fn out_of_service(self) -> Self {
        self.status(HealthStatus::OutOfService)
    }

    pub fn down_with<E>(self, error: &E) -> Self
    where
        E: ErrorKind + fmt::Display + ?Sized,
    {
        self.down()
            .with_detail("error", format!("{}: {}", error.kind(), error))
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Health {
        Health {
            status: self.status,
            details: self.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl ErrorKind for Boom {
        fn kind(&self) -> &'static str {
            "ClientError"
        }
    }

    #[test]
    fn test_builder_collects_details() {
        let health = Health::up()
            .with_detail("versions", "6.5.0")
            .with_detail("nodes", "10.0.0.1")
            .build();

        assert_eq!(health.status(), HealthStatus::Up);
        assert_eq!(health.detail("versions"), Some("6.5.0"));
        assert_eq!(health.detail("nodes"), Some("10.0.0.1"));
        assert_eq!(health.details().len(), 2);
    }

    #[test]
    fn test_down_records_error_detail() {
        let health = Health::down(&Boom);
        assert_eq!(health.status(), HealthStatus::Down);
        assert_eq!(
            health.detail("error"),
            Some("ClientError: connection refused")
        );
    }

    #[test]
    fn test_json_shape() {
        let health = Health::up().with_detail("nodes", "").build();
        let value = serde_json::to_value(&health).unwrap();
        assert_eq!(value, serde_json::json!({"status": "UP", "details": {"nodes": ""}}));

        let bare = serde_json::to_value(Health::unknown().build()).unwrap();
        assert_eq!(bare, serde_json::json!({"status": "UNKNOWN"}));
    }
}
