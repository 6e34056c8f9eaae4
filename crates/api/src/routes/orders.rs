//! Order placement and read endpoints. All require authentication.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{ItemRequest, Order, OrderRequest, OrderWithItems};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::{AppState, Store};

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: u32,
}

// -- Handlers --

/// POST /orders — atomically place an order for the authenticated customer.
#[tracing::instrument(skip(state, req), fields(customer_id = %user.0))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let lines = req
        .items
        .into_iter()
        .map(|line| ItemRequest::new(line.product_id.into(), line.quantity))
        .collect();
    let request = OrderRequest::new(lines)
        .map_err(|e| ApiError::Store(store::StoreError::InvalidRequest(e)))?;

    let order = state.store.place_order(user.0, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/:id — fetch an order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let order = state
        .store
        .order_by_id(OrderId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id} not found")))?;
    Ok(Json(order))
}

/// GET /orders — the authenticated customer's orders, most recent first.
#[tracing::instrument(skip(state), fields(customer_id = %user.0))]
pub async fn list_mine<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
) -> Result<Json<Vec<OrderWithItems>>, ApiError> {
    Ok(Json(state.store.orders_by_customer(user.0).await?))
}
