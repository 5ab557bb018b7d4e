//! Liveness endpoint.

use axum::Json;
use serde_json::{Value, json};

/// `GET /`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
