//! Course knowledge: document parsing, chunking and retrieval.
//!
//! Provides the `CourseIndex` contract consumed by the retrieval tools and a
//! local in-memory implementation backed by trigram embeddings.

pub mod document;
pub mod index;
pub mod ingest;
pub mod memory;
pub mod trigram;
pub mod types;

pub use document::{is_course_document, parse_course_file, parse_course_text};
pub use index::CourseIndex;
pub use ingest::{add_course_document, ingest_folder};
pub use memory::MemoryIndex;
pub use trigram::TrigramEmbedder;
pub use types::{
    ChunkingOptions, Course, CourseChunk, CourseMetadata, IngestStats, Lesson, Passage,
    SearchResults,
};
