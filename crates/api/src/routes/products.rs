//! Product catalog endpoints.
//!
//! Reads are public; mutations require a valid bearer token. No role
//! checks beyond that.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{Money, ProductId};
use domain::{NewProduct, Product};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::{AppState, Store};

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stock: u32,
    pub price_cents: i64,
}

impl ProductRequest {
    fn into_new_product(self) -> Result<NewProduct, ApiError> {
        let price = Money::from_cents(self.price_cents);
        if price.is_negative() {
            return Err(ApiError::BadRequest("price must not be negative".into()));
        }
        Ok(NewProduct::new(
            self.name,
            self.description,
            self.stock,
            price,
        ))
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    /// Exact-name filter.
    pub name: Option<String>,
}

/// GET /products — list the catalog, optionally filtered by exact name.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = match params.name.as_deref() {
        Some(name) => state.store.products_by_name(name).await?,
        None => state.store.products().await?,
    };
    Ok(Json(products))
}

/// GET /products/:id — fetch one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .store
        .product_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id} not found")))?;
    Ok(Json(product))
}

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: AuthUser,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.store.create_product(req.into_new_product()?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/:id — replace a product's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .store
        .update_product(ProductId::new(id), req.into_new_product()?)
        .await?;
    Ok(Json(product))
}

/// DELETE /products/:id — remove a product.
#[tracing::instrument(skip(state))]
pub async fn remove<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_product(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
