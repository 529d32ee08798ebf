//! API Routes
//!
//! Configures the Axum router for the metadata server.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, metadata_handler, missing_id_handler, stats_handler, AppState,
};

/// Creates the router.
///
/// # Endpoints
/// - `GET /{resource}/:id` - Metadata page for an identifier
/// - `GET /{resource}` and `GET /{resource}/` - `bad_id` page
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState, resource: &str) -> Router {
    let resource = resource.trim_matches('/');

    Router::new()
        .route(&format!("/{}", resource), get(missing_id_handler))
        .route(&format!("/{}/", resource), get(missing_id_handler))
        .route(&format!("/{}/:id", resource), get(metadata_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
