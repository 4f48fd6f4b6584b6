//! Error normalization at the HTTP boundary.
//!
//! [`AppError`] is the only place a failure is turned into a wire response.
//! Converting it into a response logs the failure once, tagged with the
//! method and path of the ambient request, and writes exactly one body of the
//! shape
//!
//! ```json
//! { "error": { "code": "NOT_FOUND", "message": "Song lesson not found", "details": {} } }
//! ```
//!
//! Internal failures keep their cause for the log only; the client always
//! sees a generic message.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use content_core::{context, ContentError, ErrorKind};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// Message shown to clients for every internal failure.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Body written when rendering the normalized body itself fails.
const FALLBACK_BODY: &str =
    r#"{"error":{"code":"INTERNAL_ERROR","message":"Internal server error","details":{}}}"#;

/// Stable error codes exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 500 and anything unmapped
    InternalError,
}

impl ErrorCode {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status paired with this code.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidInput => Self::BadRequest,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Unauthorized => Self::Unauthorized,
            ErrorKind::Forbidden => Self::Forbidden,
            ErrorKind::Internal => Self::InternalError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<String>) -> Result<Json<Lesson>, AppError> {
///     let id: i64 = id.parse().map_err(|_| AppError::bad_request("Invalid id"))?;
///     let lesson = repo
///         .lesson(id)
///         .await?
///         .ok_or_else(|| AppError::not_found("Song lesson not found"))?;
///     Ok(Json(lesson))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    code: ErrorCode,
    message: String,
    details: Value,
    /// Cause, logged but never sent to the client
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create an error with an explicit code.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = match code {
            ErrorCode::InternalError => INTERNAL_MESSAGE.to_owned(),
            _ => message.into(),
        };

        Self {
            code,
            message,
            details: Value::Object(serde_json::Map::new()),
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach client-visible details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// 500 Internal Server Error. The client sees [`INTERNAL_MESSAGE`].
    #[must_use]
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCode::InternalError, INTERNAL_MESSAGE).with_source(source.into())
    }

    /// Build the error reported for a handler that panicked.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic payload");

        Self::internal(anyhow::anyhow!("handler panicked: {detail}"))
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.code.status()
    }

    /// Client-visible message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn log(&self) {
        let ctx = context::current();
        let method = ctx.as_deref().map_or("-", |c| c.method());
        let path = ctx.as_deref().map_or("-", |c| c.path());
        let status = self.status().as_u16();
        let trace = self.source.as_ref().map(|e| format!("{e:?}"));

        tracing::error!(
            method,
            path,
            status,
            code = self.code.as_str(),
            trace = trace.as_deref(),
            "Request failed: {method} {path} status={status} code={} message={}",
            self.code,
            self.message,
        );
    }

    fn render(&self) -> Result<Response, serde_json::Error> {
        let body = serde_json::to_vec(&ErrorEnvelope {
            error: ErrorBody {
                code: self.code,
                message: &self.message,
                details: &self.details,
            },
        })?;

        Ok(json_response(self.status(), Body::from(body)))
    }
}

fn json_response(status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Minimal internal-error response used when normalization itself fails.
#[must_use]
pub fn fallback_response() -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        Body::from(FALLBACK_BODY),
    )
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
    details: &'a Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        self.render().unwrap_or_else(|_| fallback_response())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        let code = ErrorCode::from(err.kind());
        match code {
            ErrorCode::InternalError => Self::internal(err),
            _ => Self::new(code, err.to_string()),
        }
    }
}

/// Convert `anyhow::Error` to an internal `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}
