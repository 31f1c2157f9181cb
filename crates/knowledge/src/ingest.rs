//! Loading course documents into an index.

use crate::document::{is_course_document, parse_course_file};
use crate::index::CourseIndex;
use crate::types::{ChunkingOptions, IngestStats};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use syllabus_core::AppResult;
use walkdir::WalkDir;

/// Add a single course document.
///
/// A course whose title is already indexed is skipped and reported as zero.
pub fn add_course_document(
    index: &dyn CourseIndex,
    path: &Path,
    chunking: ChunkingOptions,
) -> AppResult<IngestStats> {
    let (course, chunks) = parse_course_file(path, chunking)?;

    if index.course_titles().iter().any(|t| t == &course.title) {
        tracing::info!("Course already indexed, skipping: {}", course.title);
        return Ok(IngestStats::default());
    }

    index.add_course(&course)?;
    index.add_chunks(&chunks)?;

    tracing::info!("Added course '{}' ({} chunks)", course.title, chunks.len());

    Ok(IngestStats {
        courses_added: 1,
        chunks_added: chunks.len(),
    })
}

/// Add every supported document under `folder`.
///
/// With `clear_existing` the index is emptied first. Files that fail to parse
/// are logged and skipped. A missing folder adds nothing.
pub fn ingest_folder(
    index: &dyn CourseIndex,
    folder: &Path,
    chunking: ChunkingOptions,
    clear_existing: bool,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    if !folder.is_dir() {
        tracing::warn!("Course folder not found: {:?}", folder);
        return Ok(IngestStats::default());
    }

    if clear_existing {
        tracing::info!("Clearing existing course data");
        index.clear()?;
    }

    let mut existing: HashSet<String> = index.course_titles().into_iter().collect();
    let mut stats = IngestStats::default();

    for entry in WalkDir::new(folder)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_course_document(path) {
            continue;
        }

        let (course, chunks) = match parse_course_file(path, chunking) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        if existing.contains(&course.title) {
            tracing::debug!("Course already indexed: {}", course.title);
            continue;
        }

        if let Err(e) = index.add_course(&course).and_then(|_| index.add_chunks(&chunks)) {
            tracing::warn!("Failed to index {:?}: {}", path, e);
            continue;
        }

        tracing::debug!("Indexed {:?}: '{}', {} chunks", path, course.title, chunks.len());
        stats.courses_added += 1;
        stats.chunks_added += chunks.len();
        existing.insert(course.title);
    }

    tracing::info!(
        "Ingested {} courses, {} chunks from {:?} in {:.2}s",
        stats.courses_added,
        stats.chunks_added,
        folder,
        start.elapsed().as_secs_f64()
    );

    Ok(stats)
}
