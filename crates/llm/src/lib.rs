//! Completion-endpoint crate for Syllabus.
//!
//! Provides a provider-agnostic abstraction over tool-capable chat models.
//! A completion either answers with text or asks for one or more tool
//! invocations, which the caller executes and folds back as tool results.
//!
//! # Providers
//! - **Anthropic**: Messages API (default)
//! - **Ollama**: local chat endpoint
//!
//! # Example
//! ```no_run
//! use syllabus_llm::{LlmClient, LlmRequest, Message, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("llama3.2", vec![Message::user("Hello, world!")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, DEFAULT_MAX_TOKENS};
pub use factory::create_client;
pub use providers::{AnthropicClient, OllamaClient};
pub use types::{
    ContentBlock, InputSchema, Message, MessageContent, ParamType, PropertySchema, Role,
    StopReason, ToolChoice, ToolDefinition, ToolInvocation, ToolResult,
};
