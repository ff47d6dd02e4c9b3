//! Shared application state handed to every handler
//!
//! The state is transport-agnostic: it holds the catalog operations, the
//! order lifecycle, the auth provider and the event bus. Handlers pull the
//! pieces they need through `State` or `FromRef`.

use crate::catalog::ProductCatalog;
use crate::core::auth::AuthProvider;
use crate::core::events::EventBus;
use crate::orders::OrderLifecycle;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: ProductCatalog,
    pub orders: Arc<OrderLifecycle>,
    pub auth: Arc<dyn AuthProvider>,
    pub events: EventBus,
}

impl FromRef<AppState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for EventBus {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}
