use axum::Json;
use serde_json::{json, Value};

/// GET / - Liveness message
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "Backend is running" }))
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
