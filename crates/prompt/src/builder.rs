//! Prompt rendering for the course assistant.

use crate::builtin;
use crate::loader::{list_prompts, load_or_builtin};
use crate::types::{PromptDefinition, QUERY_PROMPT_ID, SYSTEM_PROMPT_ID};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use syllabus_core::{AppError, AppResult};

#[derive(Serialize)]
struct SystemVars<'a> {
    history: Option<&'a str>,
    round: usize,
    max_rounds: usize,
}

#[derive(Serialize)]
struct QueryVars<'a> {
    query: &'a str,
}

/// Compiled system and query templates.
///
/// Templates are registered once at load time, so a malformed override
/// fails fast instead of on the first query.
pub struct PromptSet {
    registry: Handlebars<'static>,
    system: PromptDefinition,
    query: PromptDefinition,
}

impl std::fmt::Debug for PromptSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptSet")
            .field("system", &self.system.id)
            .field("query", &self.query.id)
            .finish()
    }
}

impl PromptSet {
    /// Built-in templates only.
    pub fn builtin() -> AppResult<Self> {
        let system = builtin::definition(SYSTEM_PROMPT_ID)
            .ok_or_else(|| AppError::Prompt("Missing built-in system prompt".to_string()))?;
        let query = builtin::definition(QUERY_PROMPT_ID)
            .ok_or_else(|| AppError::Prompt("Missing built-in query prompt".to_string()))?;
        Self::from_definitions(system, query)
    }

    /// Built-in templates, replaced by `.syllabus/prompts/<id>.yml` where present.
    ///
    /// Override files with any other id are reported and ignored.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        for id in list_prompts(workspace_path)? {
            if id != SYSTEM_PROMPT_ID && id != QUERY_PROMPT_ID {
                tracing::warn!("Ignoring unknown prompt override '{}'", id);
            }
        }

        let system = load_or_builtin(workspace_path, SYSTEM_PROMPT_ID)?;
        let query = load_or_builtin(workspace_path, QUERY_PROMPT_ID)?;
        Self::from_definitions(system, query)
    }

    /// Compile the given definitions.
    pub fn from_definitions(system: PromptDefinition, query: PromptDefinition) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        for def in [&system, &query] {
            registry
                .register_template_string(&def.id, &def.template)
                .map_err(|e| {
                    AppError::Prompt(format!("Failed to register template '{}': {}", def.id, e))
                })?;
        }

        tracing::debug!(system = %system.created_by, query = %query.created_by, "Compiled prompt set");

        Ok(Self {
            registry,
            system,
            query,
        })
    }

    /// Render the system directive for one round.
    ///
    /// `history` is omitted when `None` or blank.
    pub fn render_system(&self, history: Option<&str>, round: usize, max_rounds: usize) -> String {
        let history = history.filter(|h| !h.trim().is_empty());
        let vars = SystemVars {
            history,
            round,
            max_rounds,
        };

        match self.registry.render(&self.system.id, &vars) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("System template failed to render, using built-in text: {}", e);
                fallback_system(history, round, max_rounds)
            }
        }
    }

    /// Frame a user question for the model.
    pub fn render_query(&self, query: &str) -> String {
        match self.registry.render(&self.query.id, &QueryVars { query }) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Query template failed to render, using built-in text: {}", e);
                format!("Answer this question about course materials: {}", query)
            }
        }
    }

    pub fn system_definition(&self) -> &PromptDefinition {
        &self.system
    }

    pub fn query_definition(&self) -> &PromptDefinition {
        &self.query
    }
}

fn fallback_system(history: Option<&str>, round: usize, max_rounds: usize) -> String {
    let mut text = builtin::COURSE_INSTRUCTIONS.to_string();
    if let Some(history) = history {
        text.push_str("\n\nPrevious conversation:\n");
        text.push_str(history);
    }
    text.push_str(&format!("\n\n[Round {} of {}]", round, max_rounds));
    text
}
