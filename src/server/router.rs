//! REST router assembly
//!
//! Health routes stay at the root; `/orders` and `/products` are nested
//! under the configured prefix.

use super::host::AppState;
use crate::config::ServerConfig;
use crate::{catalog, orders};
use axum::http::{Method, header};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Business routes, without prefix or middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(orders::routes())
        .merge(catalog::routes())
}

/// Liveness routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "storefront"
    }))
}

/// Full application router with state, tracing and CORS
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let prefix = config.route_prefix.trim_end_matches('/');
    let api = api_routes().with_state(state);

    let app = if prefix.is_empty() {
        health_routes().merge(api)
    } else {
        health_routes().nest(prefix, api)
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config.permissive_cors)),
    )
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
