//! Server module: shared state, router assembly and the builder
//!
//! `ServerBuilder` wires a catalog store, an order ledger and an auth
//! provider into an axum `Router` with:
//! - `/health` and `/healthz` at the root
//! - `/orders` and `/products` under the configured prefix

pub mod builder;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::AppState;
pub use router::{api_routes, build_router, health_routes};
