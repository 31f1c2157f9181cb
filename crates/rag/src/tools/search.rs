//! Course content search tool.

use super::{Source, Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use syllabus_knowledge::{CourseIndex, Passage};
use syllabus_llm::{InputSchema, ParamType, ToolDefinition};

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchInput {
    pub query: String,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub lesson_number: Option<u32>,
}

/// Searches course passages, optionally filtered by course and lesson.
pub struct CourseSearchTool {
    index: Arc<dyn CourseIndex>,
}

impl CourseSearchTool {
    pub fn new(index: Arc<dyn CourseIndex>) -> Self {
        Self { index }
    }

    fn label(passage: &Passage) -> String {
        match passage.lesson_number {
            Some(n) => format!("{} - Lesson {}", passage.course_title, n),
            None => passage.course_title.clone(),
        }
    }

    fn source(&self, passage: &Passage) -> Source {
        let link = passage
            .lesson_number
            .and_then(|n| self.index.lesson_link(&passage.course_title, n));
        Source::new(Self::label(passage), link)
    }
}

fn no_results_message(input: &SearchInput) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(course) = &input.course_name {
        message.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = input.lesson_number {
        message.push_str(&format!(" in lesson {}", lesson));
    }
    message.push('.');
    message
}

#[async_trait]
impl Tool for CourseSearchTool {
    type Input = SearchInput;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: InputSchema::object()
                .property(
                    "query",
                    ParamType::String,
                    "What to search for in the course content",
                    true,
                )
                .property(
                    "course_name",
                    ParamType::String,
                    "Course title (partial matches work, e.g. 'MCP', 'Introduction')",
                    false,
                )
                .property(
                    "lesson_number",
                    ParamType::Integer,
                    "Specific lesson number to search within (e.g. 1, 2, 3)",
                    false,
                ),
        }
    }

    async fn execute(&self, input: SearchInput) -> Result<ToolOutput, ToolError> {
        let results = self.index.search(
            &input.query,
            input.course_name.as_deref(),
            input.lesson_number,
        );

        if let Some(error) = results.error {
            return Ok(ToolOutput::text(error));
        }

        if results.is_empty() {
            return Ok(ToolOutput::text(no_results_message(&input)));
        }

        let blocks: Vec<String> = results
            .passages
            .iter()
            .map(|p| format!("[{}]\n{}", Self::label(p), p.text))
            .collect();
        let sources = results.passages.iter().map(|p| self.source(p)).collect();

        Ok(ToolOutput::with_sources(blocks.join("\n\n"), sources))
    }
}
