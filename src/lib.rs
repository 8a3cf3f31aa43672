// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod osm;
pub mod render;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use services::MapService;
use std::time::Duration;

// App state for sharing across the application
pub struct AppState {
    pub map_service: MapService,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}
