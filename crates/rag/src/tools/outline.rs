//! Course outline tool.

use super::{Source, Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use syllabus_knowledge::CourseIndex;
use syllabus_llm::{InputSchema, ParamType, ToolDefinition};

pub const OUTLINE_TOOL_NAME: &str = "get_course_outline";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutlineInput {
    pub course_name: String,
}

/// Returns a course's title, link and lesson list.
pub struct CourseOutlineTool {
    index: Arc<dyn CourseIndex>,
}

impl CourseOutlineTool {
    pub fn new(index: Arc<dyn CourseIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    type Input = OutlineInput;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: OUTLINE_TOOL_NAME.to_string(),
            description: "Get the complete outline of a course: title, course link and every lesson with its number and title"
                .to_string(),
            input_schema: InputSchema::object().property(
                "course_name",
                ParamType::String,
                "Course title (partial matches work, e.g. 'MCP', 'Introduction')",
                true,
            ),
        }
    }

    async fn execute(&self, input: OutlineInput) -> Result<ToolOutput, ToolError> {
        let Some(title) = self.index.resolve_course_name(&input.course_name) else {
            return Ok(ToolOutput::text(format!(
                "No course found matching '{}'",
                input.course_name
            )));
        };

        let metadata = match self.index.course_metadata(&title) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                return Ok(ToolOutput::text("No course metadata found for this course"))
            }
            Err(e) => {
                tracing::warn!("Outline lookup failed for '{}': {}", title, e);
                return Ok(ToolOutput::text(format!(
                    "Error retrieving course outline: {}",
                    e
                )));
            }
        };

        let mut lines = vec![format!("Course: {}", metadata.title)];
        if let Some(link) = &metadata.course_link {
            lines.push(format!("Course Link: {}", link));
        }
        if let Some(instructor) = &metadata.instructor {
            lines.push(format!("Instructor: {}", instructor));
        }

        match metadata.lessons.as_deref() {
            Some(lessons) if !lessons.is_empty() => {
                lines.push(String::new());
                lines.push(format!("Lessons ({} total):", lessons.len()));
                for lesson in lessons {
                    lines.push(format!("Lesson {}: {}", lesson.lesson_number, lesson.title));
                }
            }
            _ => {
                lines.push(String::new());
                lines.push("No lesson information available.".to_string());
            }
        }

        let source = Source::new(metadata.title.clone(), metadata.course_link.clone());
        Ok(ToolOutput::with_sources(lines.join("\n"), vec![source]))
    }
}
