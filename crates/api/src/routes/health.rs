//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// GET /health — liveness probe, always `ok` while the process serves.
pub async fn check() -> Json<Health> {
    Json(Health { status: "ok" })
}
