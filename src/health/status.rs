// src/health/status.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Up,
    Down,
    OutOfService,
    #[default]
    Unknown,
}

impl HealthStatus {
    pub fn code(&self) -> &'static str {
        match self {
            HealthStatus::Up => "UP",
            HealthStatus::Down => "DOWN",
            HealthStatus::OutOfService => "OUT_OF_SERVICE",
            HealthStatus::Unknown => "UNKNOWN",
        }
    }

    /// Lower is more severe. Aggregation keeps the most severe status.
    pub fn severity(&self) -> u8 {
        match self {
            HealthStatus::Down => 0,
            HealthStatus::OutOfService => 1,
            HealthStatus::Up => 2,
            HealthStatus::Unknown => 3,
        }
    }

    /// Whether a consumer should treat this status as serving traffic.
    pub fn is_available(&self) -> bool {
        matches!(self, HealthStatus::Up | HealthStatus::Unknown)
    }

    /// Most severe status of the set, or `Unknown` when empty.
    pub fn aggregate<I>(statuses: I) -> HealthStatus
    where
        I: IntoIterator<Item = HealthStatus>,
    {
        statuses
            .into_iter()
            .min_by_key(HealthStatus::severity)
            .unwrap_or(HealthStatus::Unknown)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
