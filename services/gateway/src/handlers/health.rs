//! Health check handlers

use axum::http::StatusCode;

/// GET / - Liveness probe (fast, no dependencies)
pub async fn alive() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Hello world")
}
