use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{ask_handler, extract_handler, health_handler, upload_handler};
use super::server::AppState;

/// Routes for the document session. `max_body_size` caps every request body,
/// uploads included.
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    let documents = Router::new()
        .route("/upload", post(upload_handler))
        .route("/ask", post(ask_handler))
        .route("/extract", post(extract_handler))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size));

    Router::new()
        .route("/health", get(health_handler))
        .merge(documents)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
