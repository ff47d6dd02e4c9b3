//! # Storefront
//!
//! Order lifecycle and stock reconciliation backend for a clothing store.
//!
//! ## Features
//!
//! - **Per-size stock**: every product tracks quantities per size
//! - **All-or-nothing reservation**: an order takes stock for every line or for none
//! - **Server-side pricing**: line prices and totals come from the catalog, never the client
//! - **Order lifecycle**: explicit status transition table, cancellation restores stock
//! - **Pluggable storage**: in-memory by default, MongoDB behind `mongodb_backend`
//! - **Injected auth**: an `AuthProvider` maps requests to callers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_catalog(InMemoryCatalog::new())
//!     .with_ledger(InMemoryOrderLedger::new())
//!     .with_config(AppConfig::from_env()?)
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod orders;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider, StaticTokenAuthProvider},
        error::{StoreError, StoreResult},
        events::{DomainEvent, EventBus, OrderEvent, ProductEvent},
        money::{PriceBreakdown, PricingPolicy},
        response::ApiResponse,
    };

    // === Catalog ===
    pub use crate::catalog::{
        CatalogService, Category, Product, ProductCatalog, ProductInput, ProductPatch, Size,
        SizeStock, StockUpdate,
    };

    // === Orders ===
    pub use crate::orders::{
        CreateOrderRequest, Order, OrderItem, OrderLedger, OrderLifecycle, OrderStatus,
        PaymentResult, ShippingInfo, StockReconciler,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryCatalog, InMemoryOrderLedger};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoCatalog, MongoOrderLedger};

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
