//! Retrieval-augmented question answering over course materials.
//!
//! The model answers with the help of two tools (content search and course
//! outline) across at most two tool rounds. [`RagSystem`] ties the tools,
//! the generation loop, session history and source reporting together.

pub mod generator;
pub mod session;
pub mod system;
pub mod tools;

#[cfg(test)]
mod tests;

pub use generator::{AiGenerator, Generation, GeneratorSettings, Outcome, Phase, MAX_ROUNDS};
pub use session::{ConversationHistory, SessionManager};
pub use system::{CourseAnalytics, QueryResponse, RagSystem};
pub use tools::{
    CourseOutlineTool, CourseSearchTool, Dispatch, Source, SourceLedger, Tool, ToolError,
    ToolOutput, ToolRegistry,
};
