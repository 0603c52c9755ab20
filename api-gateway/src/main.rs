// ==============================================================================
// main.rs - Pedigree API Gateway Entry Point
// ==============================================================================
// Description: Axum web server for pedigree upload and family-tree rendering
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};

mod handlers;
mod models;
mod state;

use state::{AppState, GatewayConfig};

/// Multipart framing allowance on top of the upload limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("Starting Pedigree API Gateway v1.0.0");

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env().context("Failed to read gateway configuration")?;
    let port = config.port;

    // Initialize application state
    let state = AppState::new(config);

    // Build router with all endpoints
    let app = build_router(state);

    // Bind server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("API Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // Table + notices + base64 image
        .route("/render", post(handlers::render))
        // Image bytes as an attachment
        .route("/download", post(handlers::download));

    // Origins are configured via CORS_ALLOWED_ORIGINS env var (comma-separated)
    let allowed_origins: Vec<_> = state
        .config()
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = state.config().max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api/pedigree", api_routes)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Request body size limit
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
