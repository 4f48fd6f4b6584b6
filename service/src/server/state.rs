//! Application state for the content HTTP server.

use crate::repository::ContentRepository;
use content_core::pagination::PageSizePolicy;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// It's cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Catalog read access
    pub repository: Arc<dyn ContentRepository>,
    /// Page size defaults and ceiling for every list endpoint
    pub page_policy: PageSizePolicy,
    /// Prefix for asset paths, without trailing slash
    pub assets_base_url: Option<Arc<str>>,
}

impl AppState {
    /// Build state around a repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ContentRepository>, page_policy: PageSizePolicy) -> Self {
        Self {
            repository,
            page_policy,
            assets_base_url: None,
        }
    }

    /// Serve asset paths under `base_url`.
    #[must_use]
    pub fn with_assets_base_url(mut self, base_url: impl Into<Arc<str>>) -> Self {
        self.assets_base_url = Some(base_url.into());
        self
    }

    /// Public URL for an asset path.
    #[must_use]
    pub fn asset_url(&self, path: &str) -> String {
        match self.assets_base_url.as_deref() {
            Some(base) => format!("{base}/{path}"),
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("page_policy", &self.page_policy)
            .field("assets_base_url", &self.assets_base_url)
            .finish_non_exhaustive()
    }
}
