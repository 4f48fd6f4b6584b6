//! Language API endpoints.
//!
//! - GET /api/v1/languages - List languages with pagination
//! - GET /api/v1/languages/:code - Get one language by code

use super::elapsed_ms;
use crate::repository::{Language, LanguageFilter};
use crate::server::state::AppState;
use axum::{extract::State, Json};
use content_core::pagination::{build_response, PaginatedResponse};
use content_web::{AppError, PageQuery, Path, Query};
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing languages.
#[derive(Debug, Default, Deserialize)]
pub struct ListLanguagesQuery {
    /// `page`, `limit` and `order`
    #[serde(flatten)]
    pub page: PageQuery,
    /// Case-insensitive name filter
    pub q: Option<String>,
}

/// Language as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResponse {
    /// Language ID
    pub id: i64,
    /// Public code
    pub code: String,
    /// Internal name
    pub machine_name: String,
    /// Display name
    pub name: String,
    /// Absolute icon URL when an asset host is configured
    pub icon_url: String,
    /// Position in listings
    pub order: i32,
    /// Narrator voice
    pub speaker: String,
}

impl LanguageResponse {
    fn from_language(language: Language, state: &AppState) -> Self {
        Self {
            icon_url: state.asset_url(&language.icon_path),
            id: language.id,
            code: language.code,
            machine_name: language.machine_name,
            name: language.name,
            order: language.order,
            speaker: language.speaker,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List languages.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/api/v1/languages?page=1&limit=10&q=span&order=asc"
/// ```
pub async fn list_languages(
    State(state): State<AppState>,
    Query(query): Query<ListLanguagesQuery>,
) -> Result<Json<PaginatedResponse<LanguageResponse>>, AppError> {
    let start = Instant::now();
    tracing::info!("Languages list request received");

    let params = query.page.params(state.page_policy);
    let filter = LanguageFilter {
        query: query.q.filter(|q| !q.is_empty()),
    };
    tracing::debug!(
        page = params.page,
        limit = params.limit,
        query = filter.query.as_deref().unwrap_or("none"),
        "Languages list"
    );

    let page = state
        .repository
        .list_languages(&filter, params, query.page.order())
        .await?;

    let response = build_response(page.items, page.total, params.page, params.limit)
        .map(|language| LanguageResponse::from_language(language, &state));

    tracing::info!(
        count = response.items.len(),
        total = response.total,
        latency_ms = elapsed_ms(start),
        "Languages list response"
    );
    Ok(Json(response))
}

/// Get one language by its public code.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/v1/languages/es
/// ```
pub async fn get_language(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LanguageResponse>, AppError> {
    let start = Instant::now();
    tracing::info!(code = %code, "Language detail request received");

    let language = state
        .repository
        .language_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found("Language not found"))?;

    tracing::info!(
        found = true,
        latency_ms = elapsed_ms(start),
        "Language detail response"
    );
    Ok(Json(LanguageResponse::from_language(language, &state)))
}
