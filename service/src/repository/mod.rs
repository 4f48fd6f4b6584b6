//! Read access to the content catalog.
//!
//! Resource modules never talk to a store directly; they go through
//! [`ContentRepository`]. Every list query receives an already-sanitized
//! [`PaginationParams`] window and returns the window together with the
//! total number of matching rows, which is what the pagination envelope
//! needs.

pub mod memory;

pub use memory::InMemoryContentStore;

use async_trait::async_trait;
use content_core::error::Result;
use content_core::pagination::{PaginationParams, SortOrder};
use serde::Serialize;

/// A language offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Primary key
    pub id: i64,
    /// Public code, e.g. `es`
    pub code: String,
    /// Internal name, e.g. `spanish`
    pub machine_name: String,
    /// Display name
    pub name: String,
    /// Icon location relative to the asset host
    pub icon_path: String,
    /// Position in listings
    pub order: i32,
    /// Narrator voice
    pub speaker: String,
}

/// A song course: a group of song lessons for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsCourse {
    /// Primary key
    pub id: i64,
    /// Display title
    pub title: String,
    /// Language being taught
    pub language_id: i64,
    /// Language the course material is written in
    pub material_language: String,
}

/// A single song lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsLesson {
    /// Primary key
    pub id: i64,
    /// Display title
    pub title: String,
    /// Owning course
    pub course_id: i64,
    /// Position within the course
    pub order: i32,
}

/// One window of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows in the window
    pub items: Vec<T>,
    /// Rows matching the query, ignoring the window
    pub total: u64,
}

/// Filters for language listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageFilter {
    /// Case-insensitive substring of the display name
    pub query: Option<String>,
}

/// Filters for song lesson listings. All filters apply to the owning course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongLessonFilter {
    /// Code of the language being taught
    pub language_code: Option<String>,
    /// Language of the material
    pub material_language: Option<String>,
    /// Owning course
    pub course_id: Option<i64>,
}

/// Filters for song course listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongCourseFilter {
    /// Code of the language being taught
    pub language_code: Option<String>,
    /// Language of the material
    pub material_language: Option<String>,
}

/// Read-only access to the content catalog.
///
/// Implementations report store failures as
/// [`ContentError::Storage`](content_core::ContentError::Storage); a missing
/// row is `Ok(None)`, not an error.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Languages ordered by `order`, then name, in the requested direction.
    async fn list_languages(
        &self,
        filter: &LanguageFilter,
        window: PaginationParams,
        order: SortOrder,
    ) -> Result<Page<Language>>;

    /// Language by its public code.
    async fn language_by_code(&self, code: &str) -> Result<Option<Language>>;

    /// Song lessons ordered by `order` in the requested direction.
    async fn list_song_lessons(
        &self,
        filter: &SongLessonFilter,
        window: PaginationParams,
        order: SortOrder,
    ) -> Result<Page<SongsLesson>>;

    /// Song lesson by id.
    async fn song_lesson(&self, id: i64) -> Result<Option<SongsLesson>>;

    /// Song courses ordered by id.
    async fn list_song_courses(&self, filter: &SongCourseFilter) -> Result<Vec<SongsCourse>>;
}
