// src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use couchbase_health::{
    config,
    couchbase::{CouchbaseClient, CouchbaseHealthProbe, CouchbaseOperations},
    health::HealthRegistry,
    server::{HealthHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("couchbase_health=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let client = CouchbaseClient::connect(&config.couchbase)
        .await
        .with_context(|| format!("Failed to connect to {}", config.couchbase.url))?;
    let operations: Arc<dyn CouchbaseOperations> = Arc::new(client);

    let registry = HealthRegistry::new();
    let probe: CouchbaseHealthProbe = CouchbaseHealthProbe::new(operations, config.health.timeout());
    registry.register("couchbase", Arc::new(probe))?;

    info!(
        "Serving health on http://{}{} (bucket timeout: {:?})",
        config.server.listen,
        config.server.path,
        config.health.timeout()
    );

    let handler = HealthHandler::new(registry, config.server.path.clone());
    ServerBuilder::new(config.server.listen)
        .with_handler(handler)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
