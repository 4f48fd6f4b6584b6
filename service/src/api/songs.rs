//! Song lesson and course API endpoints.
//!
//! - GET /api/v1/songs - List song lessons with pagination
//! - GET /api/v1/songs/courses - List song courses
//! - GET /api/v1/songs/:id - Get one song lesson

use super::elapsed_ms;
use crate::repository::{SongCourseFilter, SongLessonFilter, SongsCourse, SongsLesson};
use crate::server::state::AppState;
use axum::{extract::State, Json};
use content_core::pagination::{build_response, PaginatedResponse};
use content_web::{AppError, PageQuery, Path, Query};
use serde::Deserialize;
use std::time::Instant;

/// Query parameters for listing song lessons.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLessonsQuery {
    /// `page`, `limit` and `order`
    #[serde(flatten)]
    pub page: PageQuery,
    /// Code of the language being taught
    pub language_code: Option<String>,
    /// Language of the course material
    pub material_language: Option<String>,
    /// Owning course, must be numeric when present
    pub course_id: Option<String>,
}

/// Query parameters for listing song courses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesQuery {
    /// Code of the language being taught
    pub language_code: Option<String>,
    /// Language of the course material
    pub material_language: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// List song lessons.
///
/// # Errors
///
/// `BAD_REQUEST` ("Invalid courseId") when `courseId` is not an integer.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/api/v1/songs?languageCode=es&courseId=1&page=2&limit=5"
/// ```
pub async fn list_lessons(
    State(state): State<AppState>,
    Query(query): Query<ListLessonsQuery>,
) -> Result<Json<PaginatedResponse<SongsLesson>>, AppError> {
    let start = Instant::now();

    let course_id = non_empty(query.course_id)
        .map(|raw| raw.trim().parse::<i64>())
        .transpose()
        .map_err(|_| AppError::bad_request("Invalid courseId"))?;

    tracing::info!("Songs lessons list request received");

    let params = query.page.params(state.page_policy);
    let filter = SongLessonFilter {
        language_code: non_empty(query.language_code),
        material_language: non_empty(query.material_language),
        course_id,
    };
    tracing::debug!(
        page = params.page,
        limit = params.limit,
        language_code = filter.language_code.as_deref().unwrap_or("all"),
        "Songs lessons list"
    );

    let page = state
        .repository
        .list_song_lessons(&filter, params, query.page.order())
        .await?;
    tracing::debug!(
        total = page.total,
        returned = page.items.len(),
        "Songs lessons fetched"
    );

    let response = build_response(page.items, page.total, params.page, params.limit);

    tracing::info!(
        count = response.items.len(),
        total = response.total,
        latency_ms = elapsed_ms(start),
        "Songs lessons list response"
    );
    Ok(Json(response))
}

/// List song courses, ordered by id.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/api/v1/songs/courses?languageCode=es&materialLanguage=en"
/// ```
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Vec<SongsCourse>>, AppError> {
    let start = Instant::now();
    tracing::info!("Songs courses request received");

    let filter = SongCourseFilter {
        language_code: non_empty(query.language_code),
        material_language: non_empty(query.material_language),
    };
    let courses = state.repository.list_song_courses(&filter).await?;

    tracing::info!(
        count = courses.len(),
        latency_ms = elapsed_ms(start),
        "Songs courses response"
    );
    Ok(Json(courses))
}

/// Get one song lesson.
///
/// # Errors
///
/// - `BAD_REQUEST` ("Invalid id") when `id` is not an integer
/// - `NOT_FOUND` ("Song lesson not found") when no lesson has that id
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/v1/songs/7
/// ```
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongsLesson>, AppError> {
    let start = Instant::now();
    let lesson_id: i64 = id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid id"))?;

    tracing::info!(id = lesson_id, "Songs lesson detail request received");

    let lesson = state
        .repository
        .song_lesson(lesson_id)
        .await?
        .ok_or_else(|| AppError::not_found("Song lesson not found"))?;

    tracing::info!(
        found = true,
        latency_ms = elapsed_ms(start),
        "Songs lesson detail response"
    );
    Ok(Json(lesson))
}
