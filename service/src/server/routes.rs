//! Router configuration for the content service.
//!
//! Builds the complete Axum router with all endpoints.

use super::state::AppState;
use crate::api::{languages, songs};
use axum::{
    error_handling::HandleErrorLayer,
    handler::Handler,
    routing::{get, MethodRouter},
    BoxError, Router,
};
use content_web::{catch_panic_layer, handlers, request_context_layer, AppError};
use std::time::Duration;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Prefix for every resource route. `/health` stays outside it.
pub const API_PREFIX: &str = "/api/v1";

/// Build the complete Axum router.
///
/// Layers, outermost first:
///
/// 1. request context (correlation id, ambient context, response header)
/// 2. HTTP tracing
/// 3. per-request deadline, normalized into an internal error
/// 4. panic normalization
///
/// Unknown routes, and known routes hit with a method they do not serve, are
/// answered by a normalized `NOT_FOUND`.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let api_routes = Router::new()
        .route("/languages", read(languages::list_languages))
        .route("/languages/:code", read(languages::get_language))
        .route("/songs", read(songs::list_lessons))
        .route("/songs/courses", read(songs::list_courses))
        .route("/songs/:id", read(songs::get_lesson));

    Router::new()
        .route("/health", read(handlers::health_check))
        .nest(API_PREFIX, api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(request_context_layer())
}

/// `GET` route whose other methods fall through to the normalized not-found.
fn read<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(handlers::not_found)
}

#[allow(clippy::unused_async)]
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::internal(anyhow::anyhow!("request timed out"))
    } else {
        AppError::internal(anyhow::anyhow!("unhandled middleware error: {err}"))
    }
}
