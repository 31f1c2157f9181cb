//! Prompt templates for the Syllabus course assistant.
//!
//! This crate provides:
//! - Built-in system directive and query frame templates
//! - YAML overrides under `.syllabus/prompts/`
//! - Handlebars rendering of the per-round system text

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

pub use builder::PromptSet;
pub use loader::{list_prompts, load_or_builtin, load_prompt};
pub use types::{PromptDefinition, QUERY_PROMPT_ID, SYSTEM_PROMPT_ID};
