// src/health/error.rs
use super::report::ErrorKind;
use crate::couchbase::ClientError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl HealthError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HealthError::Timeout(_))
    }
}

impl ErrorKind for HealthError {
    fn kind(&self) -> &'static str {
        match self {
            HealthError::Timeout(_) => "Timeout",
            HealthError::Client(_) => "ClientError",
        }
    }
}
