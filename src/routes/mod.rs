pub mod download;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/download", post(download::download_map))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
