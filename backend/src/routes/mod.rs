//! Route definitions for the harvest estimation server

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{handlers, AppState};

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend = frontend_service(&state.config.frontend.static_dir);

    Router::new()
        .nest("/api", api_routes())
        .fallback_service(frontend)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/harvest-estimate", post(handlers::get_harvest_estimate))
        .route("/harvest-histogram", post(handlers::get_harvest_histogram))
        .route("/harvest-statistics", post(handlers::get_harvest_statistics))
}

/// Static single-page app; unknown paths fall back to `index.html`
fn frontend_service(static_dir: &str) -> ServeDir<ServeFile> {
    let index = Path::new(static_dir).join("index.html");
    ServeDir::new(static_dir).fallback(ServeFile::new(index))
}
