pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::parsing::handlers::handle_parse_resume;
use crate::scanner::handlers::handle_analyze;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        // Scanner API
        .route("/api/v1/analyze", post(handle_analyze))
        .route(
            "/api/v1/parse-resume",
            post(handle_parse_resume).layer(upload_limit.clone()),
        )
        // Unversioned aliases kept for existing frontends
        .route("/analyze", post(handle_analyze))
        .route(
            "/parse-resume",
            post(handle_parse_resume).layer(upload_limit),
        )
        .fallback(not_found)
        .with_state(state)
}
