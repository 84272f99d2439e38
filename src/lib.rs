// src/lib.rs
pub mod config;
pub mod couchbase;
pub mod health;
pub mod server;
