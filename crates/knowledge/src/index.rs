//! Course index abstraction.
//!
//! The tools and the answer assembler only see this trait, so the storage
//! backend can change without touching the query path.

use crate::types::{Course, CourseChunk, CourseMetadata, SearchResults};
use syllabus_core::AppResult;

/// Trait for course index backends.
pub trait CourseIndex: Send + Sync {
    /// Search course content.
    ///
    /// `course_name` is a partial title resolved before filtering;
    /// `lesson_number` is an exact filter. Failures are reported through
    /// `SearchResults::error`, never as `Err`.
    fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults;

    /// Resolve a partial or misspelled course name to a canonical title.
    fn resolve_course_name(&self, partial: &str) -> Option<String>;

    /// Stored metadata for a canonical title.
    fn course_metadata(&self, title: &str) -> AppResult<Option<CourseMetadata>>;

    /// Link for one lesson of a course, if known.
    fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;

    /// All canonical course titles in insertion order.
    fn course_titles(&self) -> Vec<String>;

    fn course_count(&self) -> usize {
        self.course_titles().len()
    }

    /// Add a course to the catalog.
    fn add_course(&self, course: &Course) -> AppResult<()>;

    /// Add content chunks for search.
    fn add_chunks(&self, chunks: &[CourseChunk]) -> AppResult<()>;

    /// Remove every course and chunk.
    fn clear(&self) -> AppResult<()>;
}
