//! LLM provider factory.
//!
//! Builds a completion client from a provider name, an optional endpoint
//! override, an optional API key and an optional API version.

use crate::client::LlmClient;
use crate::providers::{AnthropicClient, OllamaClient};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("anthropic"/"claude", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by hosted providers
/// * `api_version` - Anthropic `anthropic-version` header override
///
/// # Errors
/// Returns a message if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    api_version: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or(crate::providers::ollama::DEFAULT_ENDPOINT);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        "anthropic" | "claude" => {
            let key = match api_key {
                Some(key) if !key.trim().is_empty() => key,
                _ => return Err("Anthropic provider requires API key".to_string()),
            };
            let base_url = endpoint.unwrap_or(crate::providers::anthropic::DEFAULT_ENDPOINT);
            let client = AnthropicClient::with_base_url(base_url, key);
            Ok(Arc::new(match api_version {
                Some(version) => client.with_api_version(version),
                None => client,
            }))
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_anthropic_client() {
        let client = create_client("claude", None, Some("sk-test"), None).unwrap();
        assert_eq!(client.provider_name(), "anthropic");
    }

    #[test]
    fn test_create_anthropic_client_with_api_version() {
        let client = create_client("anthropic", None, Some("sk-test"), Some("2024-01-01")).unwrap();
        assert_eq!(client.provider_name(), "anthropic");
    }

    #[test]
    fn test_anthropic_requires_api_key() {
        match create_client("anthropic", None, Some("  "), None) {
            Err(err) => assert!(err.contains("requires API key")),
            Ok(_) => panic!("Expected error for Anthropic without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
