// src/couchbase/mod.rs
mod client;
mod info;
mod probe;

pub use client::{ClientError, CouchbaseClient, CouchbaseOperations};
pub use info::{BucketInfo, ClusterInfo, Version};
pub use probe::CouchbaseHealthProbe;
