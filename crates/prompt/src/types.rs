//! Prompt types for Syllabus.

use serde::{Deserialize, Serialize};

/// Identifier of the system directive prompt.
pub const SYSTEM_PROMPT_ID: &str = "course.system";

/// Identifier of the query frame prompt.
pub const QUERY_PROMPT_ID: &str = "course.query";

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    pub(crate) fn builtin(id: &str, title: &str, template: String) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            api_version: "1.0".to_string(),
            created_by: "builtin".to_string(),
            template,
        }
    }
}
