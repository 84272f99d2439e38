// src/health/mod.rs
mod error;
mod indicator;
mod registry;
mod report;
mod status;

pub use error::HealthError;
pub use indicator::HealthIndicator;
pub use registry::{CompositeHealth, HealthRegistry, RegistryError};
pub use report::{ErrorKind, Health, HealthBuilder};
pub use status::HealthStatus;
