//! Anthropic Messages API provider.
//!
//! API reference: https://docs.anthropic.com/en/api/messages

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::{ContentBlock, Message, StopReason, ToolChoice, ToolDefinition};
use serde::{Deserialize, Serialize};
use syllabus_core::{AppError, AppResult};

/// Default API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Messages API request body.
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

/// Messages API response body.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Anthropic completion client.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_ENDPOINT, api_key)
    }

    /// Create a client against a custom endpoint (proxies, gateways).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the `anthropic-version` header.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    fn to_anthropic_request<'a>(&self, request: &'a LlmRequest) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: &request.messages,
            system: request.system.as_deref(),
            temperature: request.temperature,
            tools: &request.tools,
            tool_choice: if request.tools_enabled() {
                request.tool_choice
            } else {
                None
            },
        }
    }

    fn convert_response(&self, response: AnthropicResponse) -> LlmResponse {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        LlmResponse {
            content: response.content,
            stop_reason: response.stop_reason.unwrap_or(StopReason::EndTurn),
            model: response.model,
            usage,
        }
    }
}

/// Render an error body, preferring the structured message when present.
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<AnthropicErrorBody>(body) {
        Ok(parsed) => format!(
            "Anthropic API error ({}): {}: {}",
            status, parsed.error.kind, parsed.error.message
        ),
        Err(_) => format!("Anthropic API error ({}): {}", status, body),
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request to Anthropic"
        );

        let body = self.to_anthropic_request(request);
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Anthropic: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(describe_error(status, &error_text)));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Anthropic response: {}", e)))?;

        tracing::debug!(
            stop_reason = ?parsed.stop_reason,
            blocks = parsed.content.len(),
            "Received completion from Anthropic"
        );

        Ok(self.convert_response(parsed))
    }
}
