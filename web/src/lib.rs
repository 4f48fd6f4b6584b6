//! Axum integration for the content service.
//!
//! This crate is the HTTP edge of the request lifecycle: it establishes the
//! ambient [`RequestContext`](content_core::RequestContext) for every request
//! and turns every failure into one consistent JSON error body.
//!
//! # Request Flow
//!
//! 1. **Context**: [`request_context_layer`] resolves the correlation id and
//!    establishes the context for the rest of the request
//! 2. **Extract**: handlers pull path segments, query strings and pagination
//!    parameters with the [`extractors`], whose rejections are already
//!    normalized
//! 3. **Handle**: handlers return `Result<_, AppError>`
//! 4. **Normalize**: [`AppError`] logs the failure once, with the request's
//!    method and path, and renders `{"error": {code, message, details}}`
//! 5. **Echo**: the correlation id goes back out in `x-request-id`
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use content_web::{catch_panic_layer, handlers, request_context_layer};
//!
//! let app = Router::new()
//!     .route("/health", get(handlers::health_check))
//!     .nest("/api/v1", api_routes())
//!     .fallback(handlers::not_found)
//!     .layer(catch_panic_layer())
//!     .layer(request_context_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::{AppError, ErrorCode};
pub use extractors::{ClientIp, CurrentRequest, PageQuery, Path, Query};
pub use middleware::{
    catch_panic_layer, request_context_layer, REQUEST_ID_HEADER, USER_ID_HEADER,
};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
