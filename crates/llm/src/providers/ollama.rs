//! Ollama LLM provider implementation.
//!
//! Uses the chat endpoint, which supports function tools.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::{ContentBlock, Message, MessageContent, Role, StopReason, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use syllabus_core::{AppError, AppResult};

/// Default local endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool>,
    options: OllamaOptions,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OllamaFunction,
}

#[derive(Debug, Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: Value,
}

/// Ollama chat response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,

    /// Ollama does not id tool calls, so ids are minted locally
    next_call_id: AtomicU64,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ENDPOINT)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            next_call_id: AtomicU64::new(1),
        }
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request(&self, request: &LlmRequest) -> AppResult<OllamaChatRequest> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
                tool_calls: Vec::new(),
            });
        }

        for message in &request.messages {
            messages.extend(convert_message(message));
        }

        let tools = request
            .tools
            .iter()
            .map(convert_tool)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(OllamaChatRequest {
            model: request.model.clone(),
            messages,
            tools,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream: false,
        })
    }

    /// Convert Ollama response to LlmResponse.
    fn convert_response(&self, response: OllamaChatResponse) -> LlmResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        let mut content = Vec::new();
        if !response.message.content.is_empty() {
            content.push(ContentBlock::Text {
                text: response.message.content,
            });
        }

        let requested_tools = !response.message.tool_calls.is_empty();
        for call in response.message.tool_calls {
            let n = self.next_call_id.fetch_add(1, Ordering::Relaxed);
            content.push(ContentBlock::ToolUse {
                id: format!("call_{}", n),
                name: call.function.name,
                input: call.function.arguments,
            });
        }

        LlmResponse {
            content,
            stop_reason: if requested_tools {
                StopReason::ToolUse
            } else {
                StopReason::EndTurn
            },
            model: response.model,
            usage,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten one block-structured message into Ollama chat messages.
///
/// Tool results become separate `tool` role messages, in block order.
fn convert_message(message: &Message) -> Vec<OllamaMessage> {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let blocks = match &message.content {
        MessageContent::Text(text) => {
            return vec![OllamaMessage {
                role: role.to_string(),
                content: text.clone(),
                tool_calls: Vec::new(),
            }]
        }
        MessageContent::Blocks(blocks) => blocks,
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    let mut tool_messages = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => text.push_str(t),
            ContentBlock::ToolUse { name, input, .. } => tool_calls.push(OllamaToolCall {
                function: OllamaFunctionCall {
                    name: name.clone(),
                    arguments: input.clone(),
                },
            }),
            ContentBlock::ToolResult { content, .. } => tool_messages.push(OllamaMessage {
                role: "tool".to_string(),
                content: content.clone(),
                tool_calls: Vec::new(),
            }),
            ContentBlock::Unknown => {}
        }
    }

    let mut out = Vec::new();
    if !text.is_empty() || !tool_calls.is_empty() {
        out.push(OllamaMessage {
            role: role.to_string(),
            content: text,
            tool_calls,
        });
    }
    out.extend(tool_messages);
    out
}

fn convert_tool(tool: &ToolDefinition) -> AppResult<OllamaTool> {
    Ok(OllamaTool {
        kind: "function",
        function: OllamaFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: serde_json::to_value(&tool.input_schema)?,
        },
    })
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request to Ollama"
        );

        let ollama_request = self.to_ollama_request(request)?;
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            tool_calls = ollama_response.message.tool_calls.len(),
            "Received chat response from Ollama"
        );

        Ok(self.convert_response(ollama_response))
    }
}
