//! Content Service: a read API over the learning content catalog.
//!
//! Every resource module follows the same shape: sanitize pagination input
//! with [`PageQuery`](content_web::PageQuery), read through
//! [`ContentRepository`](repository::ContentRepository), wrap the window in a
//! [`PaginatedResponse`](content_core::PaginatedResponse), and raise typed
//! failures that the shared error normalizer turns into wire responses.
//!
//! # Routes
//!
//! ```text
//! GET /health
//! GET /api/v1/languages            ?page&limit&q&order
//! GET /api/v1/languages/:code
//! GET /api/v1/songs                ?page&limit&languageCode&materialLanguage&courseId&order
//! GET /api/v1/songs/courses        ?languageCode&materialLanguage
//! GET /api/v1/songs/:id
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod repository;
pub mod server;

/// Default `RUST_LOG` directives when none are set.
pub const DEFAULT_LOG_FILTER: &str =
    "content_service=info,content_web=info,content_runtime=info,tower_http=debug";
