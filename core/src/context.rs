//! Ambient request context.
//!
//! Every inbound request gets exactly one [`RequestContext`]. The web layer
//! establishes it around the request future with [`establish`], after which
//! any code running inside that future can read it with [`current`] without
//! the context being threaded through function signatures.
//!
//! The binding lives in a Tokio task-local slot, so it follows the request
//! future across `.await` points and across worker threads, and concurrent
//! requests multiplexed onto the same threads never observe each other.
//!
//! Task-locals are not inherited by `tokio::spawn`. Work deferred to another
//! task must go through [`spawn`] (or wrap its future with [`scoped`]) to keep
//! the request's identity.
//!
//! # Example
//!
//! ```
//! use content_core::context::{self, RequestContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ctx = RequestContext::new("req-1", "GET", "/api/v1/songs");
//!
//! context::establish(ctx, async {
//!     let seen = context::current().map(|c| c.request_id().to_owned());
//!     assert_eq!(seen.as_deref(), Some("req-1"));
//! })
//! .await;
//!
//! assert!(context::current().is_none());
//! # }
//! ```

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::task::futures::TaskLocalFuture;
use uuid::Uuid;

tokio::task_local! {
    static CURRENT: Option<Arc<RequestContext>>;
}

/// Identity of one inbound request.
///
/// Immutable once built. The builder methods consume `self`, so the context
/// can only be adjusted before it is handed to [`establish`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl RequestContext {
    /// Create a context with a caller-supplied correlation identifier.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            path: path.into(),
            client_ip: None,
            user_id: None,
        }
    }

    /// Create a context with a freshly generated UUID v4 identifier.
    #[must_use]
    pub fn generate(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), method, path)
    }

    /// Attach the client address.
    #[must_use]
    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    /// Attach the calling user.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Correlation identifier.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// HTTP method of the request.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Original request path, including the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Client address, if one could be determined.
    #[must_use]
    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }

    /// Calling user, if the caller identified one.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Run `future` with `ctx` as the ambient request context.
///
/// A nested `establish` shadows the outer context until the inner future
/// completes.
pub fn establish<F>(
    ctx: RequestContext,
    future: F,
) -> TaskLocalFuture<Option<Arc<RequestContext>>, F>
where
    F: Future,
{
    establish_shared(Arc::new(ctx), future)
}

/// Like [`establish`], for a context that is already shared.
pub fn establish_shared<F>(
    ctx: Arc<RequestContext>,
    future: F,
) -> TaskLocalFuture<Option<Arc<RequestContext>>, F>
where
    F: Future,
{
    CURRENT.scope(Some(ctx), future)
}

/// Run a synchronous closure with `ctx` as the ambient request context.
pub fn establish_sync<R>(ctx: RequestContext, f: impl FnOnce() -> R) -> R {
    CURRENT.sync_scope(Some(Arc::new(ctx)), f)
}

/// The ambient request context, or `None` outside any established scope.
#[must_use]
pub fn current() -> Option<Arc<RequestContext>> {
    CURRENT.try_with(Clone::clone).ok().flatten()
}

/// Run `f` against the ambient request context, if any.
pub fn with_current<R>(f: impl FnOnce(Option<&RequestContext>) -> R) -> R {
    f(current().as_deref())
}

/// Bind `future` to whatever context is ambient right now.
///
/// The returned future can be polled from anywhere (another task, another
/// executor) and still observes the context captured here. Outside any scope
/// the future runs with no context.
pub fn scoped<F>(future: F) -> TaskLocalFuture<Option<Arc<RequestContext>>, F>
where
    F: Future,
{
    CURRENT.scope(current(), future)
}

/// Spawn a task that inherits the ambient request context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(scoped(future))
}
