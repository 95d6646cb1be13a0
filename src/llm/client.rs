use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::conversation::ChatMessage;
use super::openai::OpenAIClient;

/// One request to the language model.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The model to use
    pub model: String,
    /// The full context: system instruction, history, user message and any
    /// tool calls/results accumulated during the current turn
    pub messages: Vec<ChatMessage>,
    /// Tool specs in the model's function-calling envelope
    pub tools: Vec<Value>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Optional temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
}

/// The model's reply: final text, tool invocation requests, or both.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// Text content, if any
    pub content: Option<String>,
    /// Tool invocations the model wants executed, in request order
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the response finished
    pub finish_reason: FinishReason,
    /// Token usage statistics
    pub usage: Usage,
}

impl ModelResponse {
    /// A plain final-text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        }
    }

    /// A response requesting the given tool invocations.
    pub fn tool_requests(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
            finish_reason: FinishReason::ToolCalls,
            usage: Usage::default(),
        }
    }
}

/// One tool invocation requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    /// Model-assigned call id, echoed back with the result
    pub id: String,
    /// The tool to invoke
    pub name: String,
    /// The argument object
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Creates a tool call request.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// The reason the model finished generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop point reached
    Stop,
    /// Stopped to request tool calls
    ToolCalls,
    /// Maximum tokens reached
    MaxTokens,
    /// Stopped due to an error
    Error,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Errors from the language-model transport. All of these are fatal to the
/// turn they occur in.
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    /// An API error occurred
    #[error("API error: {0}")]
    ApiError(String),
    /// A network error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    /// The response from the LLM was invalid
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),
    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),
    /// The model call exceeded the configured deadline
    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for LLM clients.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends a request and returns the complete response.
    async fn complete(&self, request: ChatRequest) -> Result<ModelResponse, LLMError>;
}

/// A builder for creating LLM clients.
#[derive(Debug, Default)]
pub struct LLMClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl LLMClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL, for OpenAI-compatible providers.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates an OpenAI-compatible client.
    pub fn build_openai(self) -> Result<Arc<dyn LLMClient>, LLMError> {
        Ok(Arc::new(OpenAIClient::new(
            self.api_key
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or(LLMError::AuthError("OpenAI API key not provided".to_string()))?,
            self.base_url,
            self.timeout,
        )?))
    }
}
