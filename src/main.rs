//! Storefront server
//!
//! Reads `STOREFRONT_CONFIG` (YAML) plus environment overrides, picks the
//! storage backend and serves the REST API until SIGINT or SIGTERM.

use anyhow::Result;
use storefront::config::{AppConfig, StorageBackend};
use storefront::core::events::EventBus;
use storefront::server::ServerBuilder;
use storefront::storage::{InMemoryCatalog, InMemoryOrderLedger};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let events = EventBus::new(config.events.capacity);
    spawn_event_log(&events);

    info!(
        backend = ?config.storage.backend,
        prefix = %config.server.route_prefix,
        tokens = config.auth.tokens.len(),
        "starting storefront v{}",
        env!("CARGO_PKG_VERSION")
    );
    if config.auth.tokens.is_empty() {
        warn!("no auth tokens configured, every caller is anonymous");
    }

    let builder = ServerBuilder::new().with_event_bus(events);
    let builder = match config.storage.backend {
        StorageBackend::InMemory => builder
            .with_catalog(InMemoryCatalog::new())
            .with_ledger(InMemoryOrderLedger::new()),
        StorageBackend::Mongodb => with_mongodb(builder, &config).await?,
    };

    builder.with_config(config).serve().await
}

#[cfg(feature = "mongodb_backend")]
async fn with_mongodb(builder: ServerBuilder, config: &AppConfig) -> Result<ServerBuilder> {
    use storefront::storage::{MongoCatalog, MongoOrderLedger, mongodb::connect};

    let uri = config
        .storage
        .uri
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storage.uri is required for the mongodb backend"))?;
    let database = connect(uri, &config.storage.database).await?;

    let ledger = MongoOrderLedger::new(database.clone());
    ledger.ensure_indexes().await?;

    Ok(builder
        .with_catalog(MongoCatalog::new(database))
        .with_ledger(ledger))
}

#[cfg(not(feature = "mongodb_backend"))]
async fn with_mongodb(_builder: ServerBuilder, _config: &AppConfig) -> Result<ServerBuilder> {
    anyhow::bail!("storage.backend is mongodb but the binary was built without `mongodb_backend`")
}

/// Log every domain event at debug level
fn spawn_event_log(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => debug!(
                    kind = envelope.event.event_kind(),
                    entity_id = %envelope.event.entity_id(),
                    event_id = %envelope.id,
                    "domain event"
                ),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event log lagging");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
