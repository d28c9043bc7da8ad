pub mod handlers;
pub mod models;

use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Build the application router
pub fn router(config: ServerConfig) -> Router {
    // escaped XML inside the JSON envelope is larger than the raw document
    let body_limit = config.max_document_bytes.saturating_mul(2);

    Router::new()
        .route("/v1/analyze", post(handlers::analyze_handler))
        .route("/health", get(handlers::health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(CorsLayer::permissive()),
        )
        .with_state(config)
}
