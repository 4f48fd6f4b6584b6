//! In-memory catalog.
//!
//! Backs the demo binary and the test suites. Rows live in plain vectors
//! behind an `Arc`, so clones are cheap and share the same catalog.

use super::{
    ContentRepository, Language, LanguageFilter, Page, SongCourseFilter, SongLessonFilter,
    SongsCourse, SongsLesson,
};
use async_trait::async_trait;
use content_core::error::Result;
use content_core::pagination::{PaginationParams, SortOrder};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Catalog {
    languages: Vec<Language>,
    courses: Vec<SongsCourse>,
    lessons: Vec<SongsLesson>,
}

/// [`ContentRepository`] over rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    catalog: Arc<Catalog>,
}

impl InMemoryContentStore {
    /// Store over the given rows.
    #[must_use]
    pub fn new(
        languages: Vec<Language>,
        courses: Vec<SongsCourse>,
        lessons: Vec<SongsLesson>,
    ) -> Self {
        Self {
            catalog: Arc::new(Catalog {
                languages,
                courses,
                lessons,
            }),
        }
    }

    /// Store preloaded with a small demo catalog.
    ///
    /// Three languages, three song courses and 25 song lessons: course 1
    /// (Spanish for English speakers) has 12 lessons, course 2 (Spanish for
    /// Russian speakers) has 8, course 3 (French for English speakers) has 5.
    #[must_use]
    pub fn seeded() -> Self {
        let languages = vec![
            language(1, "es", "spanish", "Spanish", 1, "Lucia"),
            language(2, "fr", "french", "French", 2, "Celine"),
            language(3, "de", "german", "German", 3, "Hans"),
        ];

        let courses = vec![
            course(1, "Spanish Songs", 1, "en"),
            course(2, "Spanish Songs (RU)", 1, "ru"),
            course(3, "French Songs", 2, "en"),
        ];

        let lessons = [(1_i64, 12_i32), (2, 8), (3, 5)]
            .into_iter()
            .flat_map(|(course_id, count)| (1..=count).map(move |order| (course_id, order)))
            .zip(1_i64..)
            .map(|((course_id, order), id)| SongsLesson {
                id,
                title: format!("Song {order}"),
                course_id,
                order,
            })
            .collect();

        Self::new(languages, courses, lessons)
    }

    fn course(&self, id: i64) -> Option<&SongsCourse> {
        self.catalog.courses.iter().find(|c| c.id == id)
    }

    fn language_code_of(&self, course: &SongsCourse) -> Option<&str> {
        self.catalog
            .languages
            .iter()
            .find(|l| l.id == course.language_id)
            .map(|l| l.code.as_str())
    }

    fn course_matches(
        &self,
        course: &SongsCourse,
        language_code: Option<&str>,
        material_language: Option<&str>,
    ) -> bool {
        material_language.is_none_or(|m| course.material_language == m)
            && language_code.is_none_or(|code| self.language_code_of(course) == Some(code))
    }
}

fn language(
    id: i64,
    code: &str,
    machine_name: &str,
    name: &str,
    order: i32,
    speaker: &str,
) -> Language {
    Language {
        id,
        code: code.to_string(),
        machine_name: machine_name.to_string(),
        name: name.to_string(),
        icon_path: format!("icons/languages/{code}.svg"),
        order,
        speaker: speaker.to_string(),
    }
}

fn course(id: i64, title: &str, language_id: i64, material_language: &str) -> SongsCourse {
    SongsCourse {
        id,
        title: title.to_string(),
        language_id,
        material_language: material_language.to_string(),
    }
}

/// Sort, then cut out the requested window.
fn window<T: Clone>(
    mut rows: Vec<&T>,
    params: PaginationParams,
    order: SortOrder,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    rows.sort_by(|a, b| match order {
        SortOrder::Asc => compare(a, b),
        SortOrder::Desc => compare(b, a),
    });

    let total = rows.len() as u64;
    let skip = usize::try_from(params.skip).unwrap_or(usize::MAX);
    let take = usize::try_from(params.limit).unwrap_or(usize::MAX);
    let items = rows.into_iter().skip(skip).take(take).cloned().collect();

    Page { items, total }
}

#[async_trait]
impl ContentRepository for InMemoryContentStore {
    async fn list_languages(
        &self,
        filter: &LanguageFilter,
        params: PaginationParams,
        order: SortOrder,
    ) -> Result<Page<Language>> {
        let needle = filter.query.as_deref().map(str::to_lowercase);
        let rows = self
            .catalog
            .languages
            .iter()
            .filter(|l| {
                needle
                    .as_deref()
                    .is_none_or(|q| l.name.to_lowercase().contains(q))
            })
            .collect();

        Ok(window(rows, params, order, |a, b| {
            a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name))
        }))
    }

    async fn language_by_code(&self, code: &str) -> Result<Option<Language>> {
        Ok(self
            .catalog
            .languages
            .iter()
            .find(|l| l.code == code)
            .cloned())
    }

    async fn list_song_lessons(
        &self,
        filter: &SongLessonFilter,
        params: PaginationParams,
        order: SortOrder,
    ) -> Result<Page<SongsLesson>> {
        let rows = self
            .catalog
            .lessons
            .iter()
            .filter(|lesson| {
                filter.course_id.is_none_or(|id| lesson.course_id == id)
                    && self.course(lesson.course_id).is_some_and(|course| {
                        self.course_matches(
                            course,
                            filter.language_code.as_deref(),
                            filter.material_language.as_deref(),
                        )
                    })
            })
            .collect();

        Ok(window(rows, params, order, |a, b| {
            a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn song_lesson(&self, id: i64) -> Result<Option<SongsLesson>> {
        Ok(self.catalog.lessons.iter().find(|l| l.id == id).cloned())
    }

    async fn list_song_courses(&self, filter: &SongCourseFilter) -> Result<Vec<SongsCourse>> {
        let mut courses: Vec<SongsCourse> = self
            .catalog
            .courses
            .iter()
            .filter(|course| {
                self.course_matches(
                    course,
                    filter.language_code.as_deref(),
                    filter.material_language.as_deref(),
                )
            })
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use content_core::pagination::{compute_params, PageSizePolicy};

    fn params(page: &str, limit: &str) -> PaginationParams {
        compute_params(Some(page), Some(limit), PageSizePolicy::new(10, 30).unwrap())
    }

    #[tokio::test]
    async fn test_seeded_catalog_shape() {
        let store = InMemoryContentStore::seeded();
        let all = store
            .list_song_lessons(&SongLessonFilter::default(), params("1", "30"), SortOrder::Asc)
            .await
            .unwrap();

        assert_eq!(all.total, 25);
        assert_eq!(all.items.len(), 25);
        assert_eq!(store.song_lesson(25).await.unwrap().unwrap().course_id, 3);
    }

    #[tokio::test]
    async fn test_lessons_window_and_total() {
        let store = InMemoryContentStore::seeded();
        let filter = SongLessonFilter {
            course_id: Some(1),
            ..SongLessonFilter::default()
        };

        let page = store
            .list_song_lessons(&filter, params("2", "5"), SortOrder::Asc)
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        let orders: Vec<_> = page.items.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![6, 7, 8, 9, 10]);
    }

    #[tokio::test]
    async fn test_lessons_descending() {
        let store = InMemoryContentStore::seeded();
        let filter = SongLessonFilter {
            course_id: Some(3),
            ..SongLessonFilter::default()
        };

        let page = store
            .list_song_lessons(&filter, params("1", "10"), SortOrder::Desc)
            .await
            .unwrap();

        let orders: Vec<_> = page.items.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_lessons_filtered_through_course() {
        let store = InMemoryContentStore::seeded();

        let spanish = SongLessonFilter {
            language_code: Some("es".into()),
            ..SongLessonFilter::default()
        };
        let page = store
            .list_song_lessons(&spanish, params("1", "30"), SortOrder::Asc)
            .await
            .unwrap();
        assert_eq!(page.total, 20);

        let spanish_for_russians = SongLessonFilter {
            language_code: Some("es".into()),
            material_language: Some("ru".into()),
            course_id: None,
        };
        let page = store
            .list_song_lessons(&spanish_for_russians, params("1", "30"), SortOrder::Asc)
            .await
            .unwrap();
        assert_eq!(page.total, 8);
        assert!(page.items.iter().all(|l| l.course_id == 2));
    }

    #[tokio::test]
    async fn test_page_beyond_data_is_empty_with_total() {
        let store = InMemoryContentStore::seeded();
        let page = store
            .list_song_lessons(&SongLessonFilter::default(), params("99", "10"), SortOrder::Asc)
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);
    }

    #[tokio::test]
    async fn test_languages_query_is_case_insensitive() {
        let store = InMemoryContentStore::seeded();
        let filter = LanguageFilter {
            query: Some("FREN".into()),
        };

        let page = store
            .list_languages(&filter, params("1", "10"), SortOrder::Asc)
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, "fr");
    }

    #[tokio::test]
    async fn test_language_by_code() {
        let store = InMemoryContentStore::seeded();
        assert_eq!(
            store.language_by_code("de").await.unwrap().unwrap().name,
            "German"
        );
        assert!(store.language_by_code("xx").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_courses_filtered_and_ordered_by_id() {
        let store = InMemoryContentStore::seeded();
        let filter = SongCourseFilter {
            language_code: None,
            material_language: Some("en".into()),
        };

        let ids: Vec<_> = store
            .list_song_courses(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
