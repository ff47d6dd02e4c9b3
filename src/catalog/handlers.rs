//! Product HTTP handlers

use super::model::{ProductFilter, ProductInput, ProductPatch, ProductView};
use crate::core::error::StoreResult;
use crate::core::extractors::{Caller, ValidatedJson, parse_id};
use crate::core::response::ApiResponse;
use crate::server::AppState;
use axum::extract::{Path, Query, State};

pub async fn list_products(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(filter): Query<ProductFilter>,
) -> StoreResult<ApiResponse<Vec<ProductView>>> {
    let products = state.catalog.list_products(&caller, filter).await?;
    Ok(ApiResponse::list(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> StoreResult<ApiResponse<ProductView>> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::ok(state.catalog.get_product(&caller, &id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> StoreResult<ApiResponse<ProductView>> {
    let product = state.catalog.create_product(&caller, input).await?;
    Ok(ApiResponse::created(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<ProductPatch>,
) -> StoreResult<ApiResponse<ProductView>> {
    let id = parse_id(&id)?;
    let product = state.catalog.update_product(&caller, &id, patch).await?;
    Ok(ApiResponse::ok(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> StoreResult<ApiResponse<serde_json::Value>> {
    let id = parse_id(&id)?;
    state.catalog.delete_product(&caller, &id).await?;
    Ok(ApiResponse::empty())
}
