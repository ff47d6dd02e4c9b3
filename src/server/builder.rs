//! ServerBuilder for fluent API to build HTTP servers

use super::host::AppState;
use super::router::build_router;
use crate::catalog::{CatalogService, ProductCatalog};
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, StaticTokenAuthProvider};
use crate::core::events::EventBus;
use crate::orders::{OrderLedger, OrderLifecycle};
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder wiring storage, auth and configuration into a router
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_catalog(InMemoryCatalog::new())
///     .with_ledger(InMemoryOrderLedger::new())
///     .with_config(config)
///     .build()?;
/// ```
pub struct ServerBuilder {
    catalog: Option<Arc<dyn CatalogService>>,
    ledger: Option<Arc<dyn OrderLedger>>,
    auth: Option<Arc<dyn AuthProvider>>,
    event_bus: Option<EventBus>,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            catalog: None,
            ledger: None,
            auth: None,
            event_bus: None,
            config: AppConfig::default(),
        }
    }

    /// Set the catalog store (required)
    pub fn with_catalog(self, catalog: impl CatalogService + 'static) -> Self {
        self.with_catalog_arc(Arc::new(catalog))
    }

    pub fn with_catalog_arc(mut self, catalog: Arc<dyn CatalogService>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the order ledger (required)
    pub fn with_ledger(self, ledger: impl OrderLedger + 'static) -> Self {
        self.with_ledger_arc(Arc::new(ledger))
    }

    pub fn with_ledger_arc(mut self, ledger: Arc<dyn OrderLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Replace the token table from the config with another provider
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing event bus instead of creating one from the config
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the state shared by all handlers
    pub fn build_state(&mut self) -> Result<AppState> {
        self.config.validate()?;

        let catalog = self
            .catalog
            .take()
            .ok_or_else(|| anyhow!("CatalogService is required. Call .with_catalog()"))?;
        let ledger = self
            .ledger
            .take()
            .ok_or_else(|| anyhow!("OrderLedger is required. Call .with_ledger()"))?;
        let auth = self.auth.take().unwrap_or_else(|| {
            Arc::new(StaticTokenAuthProvider::from_config(&self.config.auth))
        });
        let events = self
            .event_bus
            .take()
            .unwrap_or_else(|| EventBus::new(self.config.events.capacity));

        let orders = OrderLifecycle::new(
            ledger,
            catalog.clone(),
            self.config.pricing.clone(),
            events.clone(),
        );

        Ok(AppState {
            catalog: ProductCatalog::new(catalog, events.clone()),
            orders: Arc::new(orders),
            auth,
            events,
        })
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;
        Ok(build_router(state, &self.config.server))
    }

    /// Serve on `server.bind` until SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
