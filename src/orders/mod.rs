//! Orders: ledger contract, stock reconciliation, lifecycle and routes

pub mod handlers;
pub mod ledger;
pub mod lifecycle;
pub mod model;
pub mod reconciler;
pub mod status;

pub use ledger::{OrderLedger, PaymentUpdate, StatusChange};
pub use lifecycle::OrderLifecycle;
pub use model::{
    CreateOrderRequest, Order, OrderItem, OrderItemRequest, OrderView, Payer, PaymentInfo,
    PaymentMethod, PaymentRequest, PaymentResult, PaymentStatus, ShippingInfo,
    StatusUpdateRequest,
};
pub use reconciler::{RestoreReport, StockReconciler};
pub use status::{OrderStatus, StatusInfo};

use crate::server::AppState;
use axum::{
    Router,
    routing::{get, put},
};

/// Routes for `/orders`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/orders/myorders", get(handlers::my_orders))
        .route("/orders/{id}", get(handlers::get_order))
        .route("/orders/{id}/pay", put(handlers::pay_order))
        .route("/orders/{id}/deliver", put(handlers::deliver_order))
        .route("/orders/{id}/cancel", put(handlers::cancel_order))
        .route("/orders/{id}/status", put(handlers::update_status))
}
