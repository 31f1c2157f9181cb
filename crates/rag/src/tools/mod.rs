//! Retrieval tools the model can call.
//!
//! A tool declares a typed input, and the registry decodes the model's JSON
//! arguments into it before execution. Provenance travels back with each
//! call's output instead of living on the tool.

mod outline;
mod registry;
mod search;

pub use outline::{CourseOutlineTool, OutlineInput, OUTLINE_TOOL_NAME};
pub use registry::{Dispatch, SourceLedger, ToolRegistry};
pub use search::{CourseSearchTool, SearchInput, SEARCH_TOOL_NAME};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use syllabus_llm::ToolDefinition;
use thiserror::Error;

/// Where a piece of retrieved content came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Label such as `"Course X - Lesson 2"`
    pub display: String,

    pub link: Option<String>,
}

impl Source {
    pub fn new(display: impl Into<String>, link: Option<String>) -> Self {
        Self {
            display: display.into(),
            link,
        }
    }
}

/// Text handed back to the model plus the sources behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    pub sources: Vec<Source>,
}

impl ToolOutput {
    /// Output with no provenance.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_sources(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            content: content.into(),
            sources,
        }
    }
}

/// Failures raised while running a tool.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("'{tool}' failed: {reason}")]
    Execution { tool: String, reason: String },
}

/// A tool the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Arguments decoded from the model's request.
    type Input: DeserializeOwned + Send;

    /// Schema advertised to the model; `name` must be unique in a registry.
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError>;
}
