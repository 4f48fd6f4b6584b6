//! Request context middleware.
//!
//! For every inbound request this layer:
//!
//! 1. **Resolves** the correlation id: the `x-request-id` header if it is
//!    usable, otherwise a fresh UUID v4
//! 2. **Builds** the [`RequestContext`] (method, original path and query,
//!    client IP, `x-user-id`)
//! 3. **Establishes** it as the ambient context for the rest of the request,
//!    and stores it in the request extensions
//! 4. **Instruments** the request with an `http_request` tracing span
//! 5. **Echoes** the correlation id on the response
//!
//! [`catch_panic_layer`] turns a panicking handler into the normalized
//! internal-error response. Install it inside the context layer so the
//! failure is still logged against the request.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use content_web::middleware::request_context_layer;
//!
//! let app = Router::new()
//!     .route("/api/v1/songs", get(list_songs))
//!     .layer(request_context_layer());
//! ```

use crate::error::AppError;
use crate::extractors::client_ip;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use content_core::{context, RequestContext};
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::Instrument;

/// Header carrying the correlation id, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the calling user's id, set by the gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Longest inbound correlation id that is reused as is.
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Create a layer that establishes the request context for every request.
#[must_use]
pub const fn request_context_layer() -> RequestContextLayer {
    RequestContextLayer
}

/// Layer for request context propagation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestContextLayer;

impl<S> Layer<S> for RequestContextLayer {
    type Service = RequestContextMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestContextMiddleware { inner }
    }
}

/// Middleware service for request context propagation.
#[derive(Clone, Debug)]
pub struct RequestContextMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for RequestContextMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let ctx = Arc::new(context_for(&req));
        req.extensions_mut().insert(Arc::clone(&ctx));

        let span = tracing::info_span!(
            "http_request",
            request_id = %ctx.request_id(),
            method = %req.method(),
            uri = %req.uri(),
        );

        let header_value = HeaderValue::from_str(ctx.request_id()).ok();
        let fut = context::establish_shared(ctx, self.inner.call(req));

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Some(value) = header_value {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}

/// Panic handler signature used by [`catch_panic_layer`].
pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Create a layer that converts handler panics into normalized
/// `INTERNAL_ERROR` responses.
#[must_use]
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    AppError::from_panic(payload.as_ref()).into_response()
}

/// Build the context for one request.
fn context_for(req: &Request) -> RequestContext {
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), ToString::to_string);

    let mut ctx = match inbound_request_id(req.headers()) {
        Some(id) => RequestContext::new(id, req.method().as_str(), path),
        None => RequestContext::generate(req.method().as_str(), path),
    };

    if let Some(ip) = client_ip(req.headers(), req.extensions()) {
        ctx = ctx.with_client_ip(ip.to_string());
    }
    if let Some(user_id) = header_str(req.headers(), USER_ID_HEADER) {
        ctx = ctx.with_user_id(user_id);
    }

    ctx
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn inbound_request_id(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, REQUEST_ID_HEADER).filter(|s| s.len() <= MAX_REQUEST_ID_LENGTH)
}
