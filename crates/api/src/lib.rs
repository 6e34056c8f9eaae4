//! HTTP API server for the storefront backend.
//!
//! Exposes registration/login, the product catalog, and order placement,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use auth::{AuthService, TokenManager};
use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{OrderStore, ProductStore, UserStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full storage capability the API needs from its backing store.
pub trait Store: UserStore + ProductStore + OrderStore + Clone + Send + Sync + 'static {}

impl<T> Store for T where T: UserStore + ProductStore + OrderStore + Clone + Send + Sync + 'static {}

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub store: S,
    pub auth: AuthService<S>,
}

/// Creates the application state from a store and token manager.
pub fn create_state<S: Store>(store: S, tokens: TokenManager) -> Arc<AppState<S>> {
    let auth = AuthService::new(store.clone(), tokens);
    Arc::new(AppState { store, auth })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/auth/sign-up", post(routes::auth::sign_up::<S>))
        .route("/auth/sign-in", post(routes::auth::sign_in::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", put(routes::products::update::<S>))
        .route("/products/{id}", delete(routes::products::remove::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders", get(routes::orders::list_mine::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
