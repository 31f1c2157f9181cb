//! Conversation and tool wire types.
//!
//! These mirror the content-block model used by tool-capable chat endpoints:
//! a message carries either plain text or an ordered list of blocks, and the
//! model requests tools through `tool_use` blocks answered by `tool_result`
//! blocks with the same id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

/// Message body: a plain string or structured blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Message {
    /// Plain-text user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Assistant turn replayed verbatim, including its tool requests.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// User turn that folds tool results back into the conversation.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(
                results.into_iter().map(ContentBlock::from).collect(),
            ),
        }
    }

    /// Blocks of this message; a text body is viewed as a single text block.
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match &self.content {
            MessageContent::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }
}

/// A typed piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Block kinds this crate does not model (e.g. reasoning traces).
    #[serde(other)]
    Unknown,
}

/// A tool request emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlation id; must be echoed back in the matching result
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Output of one tool invocation, correlated by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub invocation_id: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(invocation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(invocation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

impl From<ToolResult> for ContentBlock {
    fn from(result: ToolResult) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: result.invocation_id,
            content: result.content,
            is_error: result.is_error,
        }
    }
}

/// Schema advertised to the model for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

/// JSON-schema object describing a tool's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl InputSchema {
    /// Empty object schema.
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn property(
        mut self,
        name: impl Into<String>,
        kind: ParamType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(
            name,
            PropertySchema {
                kind,
                description: description.into(),
            },
        );
        self
    }
}

/// Declared type and description of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub description: String,
}

/// JSON-schema primitive types used by tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

/// How the model may use the advertised tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides whether to call a tool
    Auto,
    /// The model must call some tool
    Any,
}

/// Why the model stopped producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_wire_shape() {
        let def = ToolDefinition {
            name: "get_course_outline".to_string(),
            description: "Outline".to_string(),
            input_schema: InputSchema::object().property(
                "course_name",
                ParamType::String,
                "Course title",
                true,
            ),
        };

        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["input_schema"]["type"], "object");
        assert_eq!(value["input_schema"]["required"], json!(["course_name"]));
        assert_eq!(
            value["input_schema"]["properties"]["course_name"]["type"],
            "string"
        );
    }

    #[test]
    fn test_tool_choice_serializes_as_object() {
        assert_eq!(
            serde_json::to_value(ToolChoice::Auto).unwrap(),
            json!({"type": "auto"})
        );
    }

    #[test]
    fn test_content_blocks_parse_and_skip_unknown() {
        let blocks: Vec<ContentBlock> = serde_json::from_value(json!([
            {"type": "thinking", "thinking": "hmm", "signature": "x"},
            {"type": "text", "text": "Let me look."},
            {"type": "tool_use", "id": "toolu_1", "name": "search_course_content", "input": {"query": "mcp"}}
        ]))
        .unwrap();

        assert_eq!(blocks[0], ContentBlock::Unknown);
        assert!(matches!(&blocks[2], ContentBlock::ToolUse { id, .. } if id == "toolu_1"));
    }

    #[test]
    fn test_tool_result_message_shape() {
        let message = Message::tool_results(vec![
            ToolResult::ok("a", "first"),
            ToolResult::error("b", "boom"),
        ]);
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "tool_result");
        assert_eq!(value["content"][0]["tool_use_id"], "a");
        assert!(value["content"][0].get("is_error").is_none());
        assert_eq!(value["content"][1]["is_error"], true);
    }

    #[test]
    fn test_plain_user_message_is_string_content() {
        let value = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hi"}));
    }
}
