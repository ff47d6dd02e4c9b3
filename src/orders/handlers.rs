//! Order HTTP handlers

use super::model::{CreateOrderRequest, OrderView, PaymentResult, StatusUpdateRequest};
use crate::core::error::StoreResult;
use crate::core::extractors::{Caller, ValidatedJson, parse_id};
use crate::core::response::ApiResponse;
use crate::server::AppState;
use axum::extract::{Path, State};

pub async fn create_order(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> StoreResult<ApiResponse<OrderView>> {
    let order = state.orders.create_order(&caller, request).await?;
    Ok(ApiResponse::created(order.into()))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> StoreResult<ApiResponse<Vec<OrderView>>> {
    let orders = state.orders.list_all(&caller).await?;
    Ok(ApiResponse::list(orders.into_iter().map(OrderView::from).collect()))
}

pub async fn my_orders(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> StoreResult<ApiResponse<Vec<OrderView>>> {
    let orders = state.orders.list_mine(&caller).await?;
    Ok(ApiResponse::list(orders.into_iter().map(OrderView::from).collect()))
}

pub async fn get_order(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> StoreResult<ApiResponse<OrderView>> {
    let id = parse_id(&id)?;
    let order = state.orders.get_order(&caller, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

pub async fn pay_order(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    ValidatedJson(payment): ValidatedJson<PaymentResult>,
) -> StoreResult<ApiResponse<OrderView>> {
    let id = parse_id(&id)?;
    let order = state.orders.mark_paid(&caller, &id, payment).await?;
    Ok(ApiResponse::ok(order.into()))
}

pub async fn deliver_order(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> StoreResult<ApiResponse<OrderView>> {
    let id = parse_id(&id)?;
    let order = state.orders.mark_delivered(&caller, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> StoreResult<ApiResponse<serde_json::Value>> {
    let id = parse_id(&id)?;
    state.orders.cancel_order(&caller, &id).await?;
    Ok(ApiResponse::empty())
}

pub async fn update_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> StoreResult<ApiResponse<OrderView>> {
    let id = parse_id(&id)?;
    let order = state
        .orders
        .update_status(&caller, &id, request.status)
        .await?;
    Ok(ApiResponse::ok(order.into()))
}
