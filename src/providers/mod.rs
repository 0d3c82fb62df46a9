/*!
 * Provider implementations for the AI completion endpoint.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Mock: deterministic provider for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::catalog::ContentBlock;
use crate::errors::ProviderError;

/// A single completion call: a prompt and the JSON schema the answer must follow
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Natural-language instruction
    pub prompt: String,

    /// JSON schema of the expected response
    pub response_json_schema: Value,
}

/// The only response shape accepted from a provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionResponse {
    /// Translated content tree
    pub translated_content: ContentBlock,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the bulk driver.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The translated content or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Decode the text a model produced into a completion response
///
/// Accepts bare JSON or JSON wrapped in a markdown code fence. Anything that
/// is not an object carrying a `translated_content` object is a schema violation.
pub fn parse_completion_payload(text: &str) -> Result<CompletionResponse, ProviderError> {
    let body = strip_code_fence(text.trim());

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("response is not JSON: {}", e)))?;

    parse_completion_value(value)
}

/// Validate an already-decoded JSON payload
pub fn parse_completion_value(value: Value) -> Result<CompletionResponse, ProviderError> {
    let mut object = match value {
        Value::Object(object) => object,
        _ => {
            return Err(ProviderError::SchemaViolation(
                "response is not a JSON object".to_string(),
            ));
        }
    };

    let content = object.remove("translated_content").ok_or_else(|| {
        ProviderError::SchemaViolation("missing 'translated_content'".to_string())
    })?;

    let translated_content = ContentBlock::from_value(content)
        .map_err(|e| ProviderError::SchemaViolation(format!("'translated_content': {}", e)))?;

    Ok(CompletionResponse { translated_content })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Build the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Arc<dyn Provider> {
    let timeout = Duration::from_secs(config.get_timeout_secs());

    match config.provider {
        TranslationProvider::OpenAI | TranslationProvider::LMStudio => Arc::new(
            openai::OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout)
                .with_model(config.get_model())
                .with_temperature(config.common.temperature)
                .with_max_tokens(config.get_max_tokens()),
        ),
        TranslationProvider::Anthropic => Arc::new(
            anthropic::Anthropic::new(config.get_api_key(), config.get_endpoint(), timeout)
                .with_model(config.get_model())
                .with_temperature(config.common.temperature)
                .with_max_tokens(config.get_max_tokens()),
        ),
    }
}

pub mod anthropic;
pub mod mock;
pub mod openai;
