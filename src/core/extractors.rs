//! Axum extractors for callers, validated bodies and ids
//!
//! - [`Caller`] resolves the [`AuthContext`] through the injected provider
//! - [`ValidatedJson`] deserializes a body and runs its `validator` rules
//! - [`parse_id`] turns a path segment into a `Uuid`

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::error::StoreError;
use axum::Json;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// The authenticated (or anonymous) caller of a request
#[derive(Debug, Clone)]
pub struct Caller(pub AuthContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Arc<dyn AuthProvider>: FromRef<S>,
{
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = <Arc<dyn AuthProvider> as FromRef<S>>::from_ref(state);
        provider
            .extract_context(&parts.headers)
            .await
            .map(Caller)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected credentials");
                StoreError::unauthorized(e.to_string())
            })
    }
}

/// JSON body that passed its validation rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = StoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| StoreError::validation(format!("Invalid JSON: {}", e.body_text())))?;

        payload.validate()?;
        Ok(ValidatedJson(payload))
    }
}

/// Parse an entity id from a path segment
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::validation(format!("Invalid id '{}'", raw)))
}
