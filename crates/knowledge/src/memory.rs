//! In-memory course index.
//!
//! Keeps a catalog collection (one entry per course) and a content
//! collection (one entry per chunk), mirroring how a document store would
//! split them. Lessons are kept as serialized JSON and parsed on read.

use crate::index::CourseIndex;
use crate::trigram::{cosine_similarity, TrigramEmbedder};
use crate::types::{Course, CourseChunk, CourseMetadata, Lesson, Passage, SearchResults};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use syllabus_core::{AppError, AppResult};

/// Minimum title similarity for fuzzy course-name resolution.
const MIN_TITLE_SIMILARITY: f32 = 0.3;

#[derive(Debug)]
struct CatalogEntry {
    title: String,
    instructor: Option<String>,
    course_link: Option<String>,
    lessons_json: String,
    embedding: Vec<f32>,
}

#[derive(Debug)]
struct ContentEntry {
    chunk: CourseChunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct Store {
    catalog: Vec<CatalogEntry>,
    content: Vec<ContentEntry>,
}

impl Store {
    fn entry(&self, title: &str) -> Option<&CatalogEntry> {
        self.catalog.iter().find(|e| e.title == title)
    }
}

/// Course index held entirely in memory.
#[derive(Debug)]
pub struct MemoryIndex {
    store: RwLock<Store>,
    embedder: TrigramEmbedder,
    max_results: usize,
}

impl MemoryIndex {
    /// Create an empty index returning at most `max_results` passages per search.
    pub fn new(max_results: usize) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            embedder: TrigramEmbedder::default(),
            max_results,
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| AppError::Knowledge("Course index lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| AppError::Knowledge("Course index lock poisoned".to_string()))
    }

    fn resolve_in(&self, store: &Store, partial: &str) -> Option<String> {
        let needle = partial.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(entry) = store
            .catalog
            .iter()
            .find(|e| e.title.to_lowercase() == needle)
        {
            return Some(entry.title.clone());
        }

        if let Some(entry) = store
            .catalog
            .iter()
            .find(|e| e.title.to_lowercase().contains(&needle))
        {
            return Some(entry.title.clone());
        }

        let query = self.embedder.embed(partial);
        store
            .catalog
            .iter()
            .map(|e| (e, cosine_similarity(&query, &e.embedding)))
            .filter(|(_, score)| *score >= MIN_TITLE_SIMILARITY)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, score)| {
                tracing::debug!("Resolved '{}' to '{}' (similarity {:.3})", partial, e.title, score);
                e.title.clone()
            })
    }

    fn search_in(
        &self,
        store: &Store,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        let course_title = match course_name {
            Some(name) => match self.resolve_in(store, name) {
                Some(title) => Some(title),
                None => return SearchResults::with_error(format!("No course found matching '{}'", name)),
            },
            None => None,
        };

        let query_embedding = self.embedder.embed(query);

        let mut passages: Vec<Passage> = store
            .content
            .iter()
            .filter(|e| {
                course_title
                    .as_deref()
                    .map_or(true, |title| e.chunk.course_title == title)
            })
            .filter(|e| lesson_number.map_or(true, |n| e.chunk.lesson_number == Some(n)))
            .map(|e| Passage {
                text: e.chunk.content.clone(),
                course_title: e.chunk.course_title.clone(),
                lesson_number: e.chunk.lesson_number,
                distance: 1.0 - cosine_similarity(&query_embedding, &e.embedding),
            })
            .collect();

        passages.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        passages.truncate(self.max_results);

        tracing::debug!(
            query = %query,
            course = ?course_title,
            lesson = ?lesson_number,
            results = passages.len(),
            "Searched course content"
        );

        SearchResults::new(passages)
    }
}

impl CourseIndex for MemoryIndex {
    fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        match self.read() {
            Ok(store) => self.search_in(&store, query, course_name, lesson_number),
            Err(e) => SearchResults::with_error(format!("Search error: {}", e)),
        }
    }

    fn resolve_course_name(&self, partial: &str) -> Option<String> {
        let store = self.read().ok()?;
        self.resolve_in(&store, partial)
    }

    fn course_metadata(&self, title: &str) -> AppResult<Option<CourseMetadata>> {
        let store = self.read()?;
        let Some(entry) = store.entry(title) else {
            return Ok(None);
        };

        let lessons = match serde_json::from_str::<Vec<Lesson>>(&entry.lessons_json) {
            Ok(lessons) => Some(lessons),
            Err(e) => {
                tracing::warn!("Unreadable lesson data for '{}': {}", title, e);
                None
            }
        };

        Ok(Some(CourseMetadata {
            title: entry.title.clone(),
            instructor: entry.instructor.clone(),
            course_link: entry.course_link.clone(),
            lessons,
        }))
    }

    fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        let store = self.read().ok()?;
        let entry = store.entry(course_title)?;
        let lessons: Vec<Lesson> = serde_json::from_str(&entry.lessons_json).ok()?;
        lessons
            .into_iter()
            .find(|l| l.lesson_number == lesson_number)
            .and_then(|l| l.lesson_link)
    }

    fn course_titles(&self) -> Vec<String> {
        self.read()
            .map(|s| s.catalog.iter().map(|e| e.title.clone()).collect())
            .unwrap_or_default()
    }

    fn add_course(&self, course: &Course) -> AppResult<()> {
        let lessons_json = serde_json::to_string(&course.lessons)?;
        let embedding = self.embedder.embed(&course.title);

        let mut store = self.write()?;
        if store.entry(&course.title).is_some() {
            return Err(AppError::Knowledge(format!(
                "Course '{}' already exists",
                course.title
            )));
        }

        store.catalog.push(CatalogEntry {
            title: course.title.clone(),
            instructor: course.instructor.clone(),
            course_link: course.course_link.clone(),
            lessons_json,
            embedding,
        });

        tracing::debug!("Added course '{}' with {} lessons", course.title, course.lessons.len());
        Ok(())
    }

    fn add_chunks(&self, chunks: &[CourseChunk]) -> AppResult<()> {
        let entries: Vec<ContentEntry> = chunks
            .iter()
            .map(|chunk| ContentEntry {
                embedding: self.embedder.embed(&chunk.content),
                chunk: chunk.clone(),
            })
            .collect();

        self.write()?.content.extend(entries);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut store = self.write()?;
        store.catalog.clear();
        store.content.clear();
        tracing::info!("Cleared course index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(n: u32, title: &str, link: Option<&str>) -> Lesson {
        Lesson {
            lesson_number: n,
            title: title.to_string(),
            lesson_link: link.map(str::to_string),
        }
    }

    fn chunk(course: &str, lesson: Option<u32>, index: usize, content: &str) -> CourseChunk {
        CourseChunk {
            content: content.to_string(),
            course_title: course.to_string(),
            lesson_number: lesson,
            chunk_index: index,
        }
    }

    fn sample_index() -> MemoryIndex {
        let index = MemoryIndex::new(5);
        index
            .add_course(&Course {
                title: "MCP: Build Rich-Context AI Apps with Anthropic".to_string(),
                course_link: Some("https://example.com/mcp".to_string()),
                instructor: Some("Elie Schoppik".to_string()),
                lessons: vec![
                    lesson(0, "Introduction", Some("https://example.com/mcp/0")),
                    lesson(4, "Creating an MCP Client", None),
                ],
            })
            .unwrap();
        index
            .add_course(&Course {
                title: "Advanced Retrieval for AI with Chroma".to_string(),
                course_link: None,
                instructor: None,
                lessons: vec![lesson(1, "Overview of embeddings", None)],
            })
            .unwrap();
        index
            .add_chunks(&[
                chunk(
                    "MCP: Build Rich-Context AI Apps with Anthropic",
                    Some(0),
                    0,
                    "Lesson 0 content: the model context protocol standardizes tool access",
                ),
                chunk(
                    "MCP: Build Rich-Context AI Apps with Anthropic",
                    Some(4),
                    1,
                    "Lesson 4 content: the client session connects to a server over stdio",
                ),
                chunk(
                    "Advanced Retrieval for AI with Chroma",
                    Some(1),
                    0,
                    "Lesson 1 content: embeddings map text into vectors for retrieval",
                ),
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_resolve_exact_substring_and_fuzzy() {
        let index = sample_index();
        assert_eq!(
            index.resolve_course_name("advanced retrieval for ai with chroma").as_deref(),
            Some("Advanced Retrieval for AI with Chroma")
        );
        assert_eq!(
            index.resolve_course_name("MCP").as_deref(),
            Some("MCP: Build Rich-Context AI Apps with Anthropic")
        );
        assert_eq!(
            index.resolve_course_name("Chroma retrieval").as_deref(),
            Some("Advanced Retrieval for AI with Chroma")
        );
        assert_eq!(index.resolve_course_name("Underwater basket weaving"), None);
        assert_eq!(index.resolve_course_name("   "), None);
    }

    #[test]
    fn test_search_ranks_and_limits() {
        let index = MemoryIndex::new(1);
        index
            .add_chunks(&[
                chunk("A", None, 0, "cooking pasta recipes"),
                chunk("A", None, 1, "protocol servers expose tools"),
            ])
            .unwrap();

        let results = index.search("protocol tools", None, None);
        assert!(results.error.is_none());
        assert_eq!(results.passages.len(), 1);
        assert_eq!(results.passages[0].text, "protocol servers expose tools");
    }

    #[test]
    fn test_search_filters_by_course_and_lesson() {
        let index = sample_index();

        let results = index.search("client", Some("MCP"), Some(4));
        assert_eq!(results.passages.len(), 1);
        assert_eq!(results.passages[0].lesson_number, Some(4));

        let none = index.search("client", Some("MCP"), Some(9));
        assert!(none.error.is_none());
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_unknown_course_reports_error() {
        let index = sample_index();
        let results = index.search("anything", Some("Nonexistent"), None);
        assert_eq!(
            results.error.as_deref(),
            Some("No course found matching 'Nonexistent'")
        );
    }

    #[test]
    fn test_course_metadata_round_trips_lessons() {
        let index = sample_index();
        let meta = index
            .course_metadata("MCP: Build Rich-Context AI Apps with Anthropic")
            .unwrap()
            .unwrap();
        assert_eq!(meta.course_link.as_deref(), Some("https://example.com/mcp"));
        let lessons = meta.lessons.unwrap();
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[1].title, "Creating an MCP Client");

        assert!(index.course_metadata("Missing").unwrap().is_none());
    }

    #[test]
    fn test_lesson_link_lookup() {
        let index = sample_index();
        let title = "MCP: Build Rich-Context AI Apps with Anthropic";
        assert_eq!(
            index.lesson_link(title, 0).as_deref(),
            Some("https://example.com/mcp/0")
        );
        assert_eq!(index.lesson_link(title, 4), None);
        assert_eq!(index.lesson_link("Missing", 0), None);
    }

    #[test]
    fn test_duplicate_course_rejected_and_clear() {
        let index = sample_index();
        let duplicate = Course {
            title: "Advanced Retrieval for AI with Chroma".to_string(),
            course_link: None,
            instructor: None,
            lessons: Vec::new(),
        };
        assert!(index.add_course(&duplicate).is_err());
        assert_eq!(index.course_count(), 2);

        index.clear().unwrap();
        assert_eq!(index.course_count(), 0);
        assert!(index.search("retrieval", None, None).is_empty());
    }
}
