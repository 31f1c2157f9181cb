//! Course catalog and retrieval type definitions.

use serde::{Deserialize, Serialize};

/// A lesson inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_link: Option<String>,
}

/// A parsed course document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Canonical title, unique within an index
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,

    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A searchable piece of course text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,

    /// Position within the course, increasing across lessons
    pub chunk_index: usize,
}

/// Stored catalog entry for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub title: String,
    pub instructor: Option<String>,
    pub course_link: Option<String>,

    /// `None` when lesson data is absent or unreadable
    pub lessons: Option<Vec<Lesson>>,
}

/// One retrieved passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,

    /// Cosine distance to the query; lower is closer
    pub distance: f32,
}

/// Outcome of a content search.
///
/// Empty `passages` with no `error` means zero matches. A set `error` means
/// retrieval itself failed or a filter could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub passages: Vec<Passage>,
    pub error: Option<String>,
}

impl SearchResults {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            passages: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

/// Chunking parameters for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    /// Maximum characters per chunk
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
        }
    }
}

/// Totals reported by a folder ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub courses_added: usize,
    pub chunks_added: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_json_omits_missing_link() {
        let lesson = Lesson {
            lesson_number: 1,
            title: "Intro".to_string(),
            lesson_link: None,
        };
        let json = serde_json::to_string(&lesson).unwrap();
        assert_eq!(json, r#"{"lesson_number":1,"title":"Intro"}"#);
    }

    #[test]
    fn test_search_results_constructors() {
        assert!(SearchResults::empty().is_empty());
        assert!(SearchResults::empty().error.is_none());

        let failed = SearchResults::with_error("Search error: offline");
        assert!(failed.is_empty());
        assert_eq!(failed.error.as_deref(), Some("Search error: offline"));
    }
}
