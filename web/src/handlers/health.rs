//! Liveness and fallback endpoints.

use crate::error::AppError;
use axum::Json;
use serde::Serialize;

/// Body of the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving requests
    pub status: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does NOT check dependencies.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok"
/// }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Router fallback: every unmatched route is a normalized `NOT_FOUND`.
#[allow(clippy::unused_async)]
pub async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}
