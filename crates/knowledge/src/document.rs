//! Course document parsing and chunking.
//!
//! Expected layout:
//!
//! ```text
//! Course Title: <title>
//! Course Link: <url>
//! Course Instructor: <name>
//!
//! Lesson 0: <lesson title>
//! Lesson Link: <url>
//! <lesson text...>
//! ```

use crate::types::{ChunkingOptions, Course, CourseChunk, Lesson};
use std::path::Path;
use syllabus_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Supported document extensions.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Whether a path looks like a course document this parser accepts.
pub fn is_course_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Read and parse a course document from disk.
pub fn parse_course_file(
    path: &Path,
    chunking: ChunkingOptions,
) -> AppResult<(Course, Vec<CourseChunk>)> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    let fallback_title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled course");

    parse_course_text(&text, fallback_title, chunking)
}

struct LessonSection {
    lesson: Lesson,
    body: Vec<String>,
}

/// Parse course text into a course and its content chunks.
pub fn parse_course_text(
    text: &str,
    fallback_title: &str,
    chunking: ChunkingOptions,
) -> AppResult<(Course, Vec<CourseChunk>)> {
    let mut title = None;
    let mut course_link = None;
    let mut instructor = None;
    let mut preamble: Vec<String> = Vec::new();
    let mut sections: Vec<LessonSection> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();

        if let Some((number, lesson_title)) = lesson_marker(line) {
            sections.push(LessonSection {
                lesson: Lesson {
                    lesson_number: number,
                    title: lesson_title,
                    lesson_link: None,
                },
                body: Vec::new(),
            });
            continue;
        }

        match sections.last_mut() {
            Some(section) => {
                if section.lesson.lesson_link.is_none() && section.body.is_empty() {
                    if let Some(link) = field(line, "Lesson Link:") {
                        section.lesson.lesson_link = non_empty(link);
                        continue;
                    }
                }
                section.body.push(raw.to_string());
            }
            None => {
                if let Some(value) = field(line, "Course Title:") {
                    title = non_empty(value);
                } else if let Some(value) = field(line, "Course Link:") {
                    course_link = non_empty(value);
                } else if let Some(value) = field(line, "Course Instructor:") {
                    instructor = non_empty(value);
                } else {
                    preamble.push(raw.to_string());
                }
            }
        }
    }

    let title = title.unwrap_or_else(|| fallback_title.to_string());
    let splitter = build_splitter(chunking)?;
    let mut chunks = Vec::new();

    if sections.is_empty() {
        for piece in split(&splitter, &preamble.join("\n")) {
            chunks.push(CourseChunk {
                content: piece.to_string(),
                course_title: title.clone(),
                lesson_number: None,
                chunk_index: chunks.len(),
            });
        }
    } else {
        for section in &sections {
            let number = section.lesson.lesson_number;
            for piece in split(&splitter, &section.body.join("\n")) {
                chunks.push(CourseChunk {
                    content: format!("Lesson {} content: {}", number, piece),
                    course_title: title.clone(),
                    lesson_number: Some(number),
                    chunk_index: chunks.len(),
                });
            }
        }
    }

    let course = Course {
        title,
        course_link,
        instructor,
        lessons: sections.into_iter().map(|s| s.lesson).collect(),
    };

    tracing::debug!(
        "Parsed course '{}': {} lessons, {} chunks",
        course.title,
        course.lessons.len(),
        chunks.len()
    );

    Ok((course, chunks))
}

fn build_splitter(chunking: ChunkingOptions) -> AppResult<TextSplitter<text_splitter::Characters>> {
    let config = ChunkConfig::new(chunking.chunk_size)
        .with_overlap(chunking.chunk_overlap)
        .map_err(|e| AppError::Knowledge(format!("Invalid chunking options: {}", e)))?;
    Ok(TextSplitter::new(config))
}

fn split<'a>(
    splitter: &TextSplitter<text_splitter::Characters>,
    text: &'a str,
) -> Vec<&'a str> {
    splitter
        .chunks(text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// `Lesson <n>: <title>` marker.
fn lesson_marker(line: &str) -> Option<(u32, String)> {
    let rest = field(line, "Lesson ")?;
    let (number, title) = rest.split_once(':')?;
    let number = number.trim().parse().ok()?;
    Some((number, title.trim().to_string()))
}

/// Case-insensitive prefix match returning the trimmed remainder.
fn field<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let n = prefix.len();
    if line.len() >= n && line.is_char_boundary(n) && line[..n].eq_ignore_ascii_case(prefix) {
        Some(line[n..].trim())
    } else {
        None
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Course Title: Building Towards Computer Use with Anthropic
Course Link: https://example.com/computer-use
Course Instructor: Colt Steele

Lesson 0: Introduction
Lesson Link: https://example.com/computer-use/0
Welcome to the course. We will build an agent that uses a computer.

Lesson 1: API Basics
The messages API takes a list of messages and returns a completion.
";

    #[test]
    fn test_parse_header_and_lessons() {
        let (course, chunks) =
            parse_course_text(SAMPLE, "fallback", ChunkingOptions::default()).unwrap();

        assert_eq!(course.title, "Building Towards Computer Use with Anthropic");
        assert_eq!(course.course_link.as_deref(), Some("https://example.com/computer-use"));
        assert_eq!(course.instructor.as_deref(), Some("Colt Steele"));
        assert_eq!(course.lessons.len(), 2);
        assert_eq!(
            course.lessons[0].lesson_link.as_deref(),
            Some("https://example.com/computer-use/0")
        );
        assert_eq!(course.lessons[1].lesson_link, None);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.starts_with("Lesson 0 content: Welcome"));
        assert_eq!(chunks[1].lesson_number, Some(1));
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn test_small_chunks_split_with_increasing_index() {
        let body = "Sentence about prompting. ".repeat(40);
        let text = format!("Course Title: T\nLesson 1: Only\n{}", body);
        let chunking = ChunkingOptions {
            chunk_size: 100,
            chunk_overlap: 20,
        };

        let (_, chunks) = parse_course_text(&text, "T", chunking).unwrap();
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert!(chunk.content.starts_with("Lesson 1 content: "));
        }
    }

    #[test]
    fn test_missing_title_uses_fallback_and_lessonless_body() {
        let (course, chunks) = parse_course_text(
            "Just some notes without structure.",
            "notes",
            ChunkingOptions::default(),
        )
        .unwrap();

        assert_eq!(course.title, "notes");
        assert!(course.lessons.is_empty());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].lesson_number, None);
        assert_eq!(chunks[0].content, "Just some notes without structure.");
    }

    #[test]
    fn test_lesson_link_word_is_not_a_marker() {
        assert_eq!(lesson_marker("Lesson Link: https://x"), None);
        assert_eq!(lesson_marker("lesson 3: Tools"), Some((3, "Tools".to_string())));
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let chunking = ChunkingOptions {
            chunk_size: 10,
            chunk_overlap: 10,
        };
        assert!(parse_course_text("Lesson 1: A\ntext", "t", chunking).is_err());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_course_document(Path::new("course1_script.txt")));
        assert!(is_course_document(Path::new("NOTES.MD")));
        assert!(!is_course_document(Path::new("slides.pdf")));
        assert!(!is_course_document(Path::new("README")));
    }
}
