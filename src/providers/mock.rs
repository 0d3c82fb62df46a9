/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a translated block
 * - `MockProvider::failing_on(&[2])` - Fails on the listed call numbers
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::malformed()` - Answers without `translated_content`
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::catalog::ContentBlock;
use crate::errors::ProviderError;
use crate::providers::{parse_completion_value, CompletionRequest, CompletionResponse, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a translated block
    Working,
    /// Fails on the given 1-based call numbers, succeeds otherwise
    FailOnCalls(Vec<usize>),
    /// Always fails with an error
    Failing,
    /// Returns a payload that violates the output schema
    Malformed,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of calls received
    call_count: Arc<AtomicUsize>,
    /// Prompts received, in order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> ContentBlock>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails on specific calls (1-based)
    pub fn failing_on(calls: &[usize]) -> Self {
        Self::new(MockBehavior::FailOnCalls(calls.to_vec()))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose answers lack `translated_content`
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> ContentBlock) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn translated(&self, request: &CompletionRequest, call: usize) -> CompletionResponse {
        let translated_content = match self.custom_response {
            Some(generator) => generator(request),
            None => ContentBlock::new().text("text", format!("[TRANSLATED #{}]", call)),
        };
        CompletionResponse { translated_content }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            call_count: Arc::clone(&self.call_count),
            prompts: Arc::clone(&self.prompts),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().push(request.prompt.clone());

        match &self.behavior {
            MockBehavior::Working => Ok(self.translated(&request, call)),

            MockBehavior::FailOnCalls(calls) => {
                if calls.contains(&call) {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure (request #{})", call),
                    })
                } else {
                    Ok(self.translated(&request, call))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Malformed => {
                parse_completion_value(serde_json::json!({ "translation": "oops" }))
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(self.translated(&request, call))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
