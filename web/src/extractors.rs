//! Custom Axum extractors.
//!
//! - [`Query`]: query-string extractor whose rejections are normalized
//! - [`Path`]: path-parameter extractor whose rejections are normalized
//! - [`PageQuery`]: raw `page`, `limit` and `order` values for list endpoints
//! - [`ClientIp`]: client address from proxy headers or the socket
//! - [`CurrentRequest`]: the request context established by the middleware
//!
//! # Examples
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct ListQuery {
//!     #[serde(flatten)]
//!     page: PageQuery,
//!     q: Option<String>,
//! }
//!
//! async fn list(
//!     State(state): State<AppState>,
//!     Query(query): Query<ListQuery>,
//! ) -> Result<Json<PaginatedResponse<Item>>, AppError> {
//!     let params = query.page.params(state.page_policy);
//!     ...
//! }
//! ```

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{connect_info::ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};
use content_core::pagination::{compute_params, PageSizePolicy, PaginationParams, SortOrder};
use content_core::RequestContext;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Query-string extractor that rejects with a normalized `BAD_REQUEST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Query(value)| Self(value))
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))
    }
}

/// Path-parameter extractor that rejects with a normalized error.
///
/// Undecodable or mistyped segments are a `BAD_REQUEST`; a route without the
/// expected parameters is a wiring bug and becomes an `INTERNAL_ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| Self(value))
            .map_err(|rejection| {
                if rejection.status().is_server_error() {
                    AppError::internal(anyhow::anyhow!(rejection.body_text()))
                } else {
                    AppError::bad_request(rejection.body_text())
                }
            })
    }
}

/// Raw pagination parameters, kept as strings so that garbage never causes a
/// rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<String>,
    /// Requested page size
    pub limit: Option<String>,
    /// `asc` or `desc`
    pub order: Option<String>,
}

impl PageQuery {
    /// Sanitized window for `policy`.
    #[must_use]
    pub fn params(&self, policy: PageSizePolicy) -> PaginationParams {
        compute_params(self.page.as_deref(), self.limit.as_deref(), policy)
    }

    /// Requested ordering, ascending unless `desc`.
    #[must_use]
    pub fn order(&self) -> SortOrder {
        SortOrder::parse(self.order.as_deref())
    }
}

/// Header priority for IP extraction (highest to lowest).
const IP_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip"];

/// Client IP address, if one could be determined.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Socket peer address (requires `into_make_service_with_connect_info`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_ip(&parts.headers, &parts.extensions)))
    }
}

/// Extract the client IP from proxy headers, falling back to the socket peer.
#[must_use]
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    IP_HEADERS
        .iter()
        .find_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        })
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

/// The request context established by
/// [`request_context_layer`](crate::middleware::request_context_layer).
#[derive(Debug, Clone)]
pub struct CurrentRequest(pub Arc<RequestContext>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<RequestContext>>()
            .cloned()
            .map(Self)
            .ok_or_else(|| {
                AppError::internal(anyhow::anyhow!("request context middleware not installed"))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::http::Request;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[derive(Debug, Deserialize)]
    struct ListQuery {
        #[serde(flatten)]
        page: PageQuery,
        q: Option<String>,
    }

    #[tokio::test]
    async fn test_page_query_keeps_raw_values() {
        let mut parts = parts("/songs?page=abc&limit=500&order=desc&q=hello", &[]);
        let Query(query) = Query::<ListQuery>::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(query.page.page.as_deref(), Some("abc"));
        assert_eq!(query.q.as_deref(), Some("hello"));
        assert_eq!(query.page.order(), SortOrder::Desc);

        let params = query.page.params(PageSizePolicy::new(10, 30).unwrap());
        assert_eq!((params.page, params.limit, params.skip), (1, 30, 0));
    }

    #[tokio::test]
    async fn test_empty_query_uses_defaults() {
        let mut parts = parts("/songs", &[]);
        let Query(query) = Query::<PageQuery>::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(query, PageQuery::default());
        assert_eq!(query.order(), SortOrder::Asc);
    }

    #[tokio::test]
    async fn test_query_rejection_is_normalized() {
        #[derive(Debug, Deserialize)]
        struct Strict {
            #[allow(dead_code)]
            id: u32,
        }

        let mut parts = parts("/songs?id=seven", &[]);
        let err = Query::<Strict>::from_request_parts(&mut parts, &())
            .await
            .expect_err("Should reject");

        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    fn path_app() -> axum::Router {
        use axum::routing::get;

        axum::Router::new()
            .route(
                "/items/:id",
                get(|Path(id): Path<u32>| async move { id.to_string() }),
            )
            .route(
                "/names/:name",
                get(|Path(name): Path<String>| async move { name }),
            )
            .layer(crate::middleware::request_context_layer())
    }

    async fn send(uri: &str) -> (axum::http::StatusCode, String, Option<String>) {
        use tower::ServiceExt;

        let request = Request::builder()
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        let response = path_app().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap(), content_type)
    }

    #[tokio::test]
    async fn test_path_extracts_typed_value() {
        let (status, body, _) = send("/items/42").await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body, "42");
    }

    #[tokio::test]
    async fn test_path_type_mismatch_is_normalized() {
        let (status, body, content_type) = send("/items/seven").await;
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_path_invalid_utf8_is_normalized_and_logged() {
        let (result, logs) = content_testing::capture_logs(send("/names/%FF")).await;
        let (status, body, content_type) = result;

        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(logs.matching("Request failed").len(), 1);
    }

    #[tokio::test]
    async fn test_client_ip_from_x_forwarded_for() {
        let mut parts = parts("/", &[("X-Forwarded-For", "203.0.113.1, 198.51.100.1")]);
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.unwrap().to_string(), "203.0.113.1");
    }

    #[tokio::test]
    async fn test_client_ip_from_x_real_ip() {
        let mut parts = parts("/", &[("X-Real-IP", "198.51.100.42")]);
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.unwrap().to_string(), "198.51.100.42");
    }

    #[tokio::test]
    async fn test_client_ip_skips_invalid_header() {
        let mut parts = parts(
            "/",
            &[("X-Forwarded-For", "not-an-ip"), ("X-Real-IP", "2001:db8::1")],
        );
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.unwrap().to_string(), "2001:db8::1");
    }

    #[tokio::test]
    async fn test_client_ip_from_connect_info() {
        let mut parts = parts("/", &[]);
        parts
            .extensions
            .insert(ConnectInfo("192.0.2.7:51000".parse::<SocketAddr>().unwrap()));
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.unwrap().to_string(), "192.0.2.7");
    }

    #[tokio::test]
    async fn test_client_ip_missing() {
        let mut parts = parts("/", &[]);
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ip.is_none());
    }

    #[tokio::test]
    async fn test_current_request_requires_middleware() {
        let mut parts = parts("/", &[]);
        let err = CurrentRequest::from_request_parts(&mut parts, &())
            .await
            .expect_err("Should reject");
        assert_eq!(err.code(), ErrorCode::InternalError);

        let ctx = Arc::new(RequestContext::new("r", "GET", "/"));
        parts.extensions.insert(Arc::clone(&ctx));
        let CurrentRequest(found) = CurrentRequest::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&found, &ctx));
    }
}
