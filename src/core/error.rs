//! Typed error handling for the storefront service
//!
//! Every lifecycle and catalog operation returns [`StoreError`]. Each variant
//! maps to one HTTP status and a stable error code, so handlers can return
//! the error directly and clients can match on `code`.
//!
//! # Example
//!
//! ```rust,ignore
//! match lifecycle.cancel_order(&id, &caller).await {
//!     Ok(order) => println!("cancelled {}", order.id),
//!     Err(StoreError::InvalidTransition { from, .. }) => {
//!         println!("order is already {}", from);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use crate::catalog::Size;
use crate::orders::OrderStatus;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Convenience alias used across the crate
pub type StoreResult<T> = Result<T, StoreError>;

/// The main error type of the storefront service
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing input
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A referenced entity does not exist
    #[error("{entity} not found with id of {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The caller lacks the ownership or role required
    #[error("{0}")]
    Unauthorized(String),

    /// The requested size is missing or has too few units left
    #[error("Not enough stock for {product_name} (Size: {size})")]
    OutOfStock {
        product_id: Uuid,
        product_name: String,
        size: Size,
        requested: u32,
        available: u32,
    },

    /// The order status does not allow the requested move
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Backend failure (lock poisoning, driver errors, serialization)
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Error body returned to HTTP clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`, mirrors the success envelope
    pub success: bool,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoreError {
    /// Build a validation error with only a message
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Build an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        StoreError::Unauthorized(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            StoreError::OutOfStock { .. } => StatusCode::BAD_REQUEST,
            StoreError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Validation { .. } => "VALIDATION_ERROR",
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::Unauthorized(_) => "UNAUTHORIZED",
            StoreError::OutOfStock { .. } => "OUT_OF_STOCK",
            StoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            StoreError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StoreError::Validation { details, .. } => details.clone(),
            StoreError::NotFound { entity, id } => Some(serde_json::json!({
                "entity": entity,
                "id": id.to_string()
            })),
            StoreError::OutOfStock {
                product_id,
                size,
                requested,
                available,
                ..
            } => Some(serde_json::json!({
                "productId": product_id.to_string(),
                "size": size,
                "requested": requested,
                "available": available
            })),
            StoreError::InvalidTransition { from, to } => Some(serde_json::json!({
                "from": from,
                "to": to
            })),
            _ => None,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).ok();
        StoreError::Validation {
            message: format!("Validation failed: {}", errors),
            details,
        }
    }
}
