use axum::Router;
use osmprint::config::Config;
use osmprint::render::PdfRenderer;
use osmprint::services::overpass::OverpassClient;
use osmprint::services::MapService;
use osmprint::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "osmprint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting osmprint map server");
    tracing::info!(
        "Padding {}°, request timeout {}s, upload limit {} bytes",
        config.padding_deg,
        config.request_timeout_secs,
        config.max_upload_bytes
    );

    // Initialize services
    let provider = OverpassClient::with_config(&config.overpass);
    match &config.overpass.endpoint {
        Some(endpoint) => tracing::info!("Using Overpass endpoint {}", endpoint),
        None => tracing::info!("Using built-in Overpass endpoints with fallback"),
    }

    let map_service = MapService::new(
        Arc::new(provider),
        Arc::new(PdfRenderer::new()),
        config.padding_deg,
        config.map_title.clone(),
    );

    // Create application state
    let state = Arc::new(AppState {
        map_service,
        request_timeout: config.request_timeout(),
        max_upload_bytes: config.max_upload_bytes,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .merge(osmprint::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
