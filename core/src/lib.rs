//! # Content Core
//!
//! Request-lifecycle primitives shared by every content resource module.
//!
//! - [`context`]: ambient, request-scoped identity that follows async
//!   continuations without being passed as a parameter
//! - [`pagination`]: sanitized `(page, limit, skip)` windows and the list
//!   response envelope
//! - [`error`]: the closed set of failure kinds resource modules raise
//!
//! Nothing in this crate performs I/O. Delivery of log records lives in
//! `content-runtime`; translation of errors to HTTP lives in `content-web`.

pub mod context;
pub mod error;
pub mod pagination;

pub use context::RequestContext;
pub use error::{ContentError, ErrorKind};
pub use pagination::{
    build_response, compute_params, PageSizePolicy, PaginatedResponse, PaginationParams, SortOrder,
};
