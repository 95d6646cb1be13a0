use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{
    ChatRequest, FinishReason, LLMClient, LLMError, ModelResponse, ToolCallRequest, Usage,
};
use crate::conversation::ChatMessage;

/// OpenAI API response for chat completions.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: UsageInfo,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    #[serde(default)]
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct UsageInfo {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// An LLM client for OpenAI's chat completions API.
///
/// Works against any OpenAI-compatible provider via a custom base URL.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
}

impl OpenAIClient {
    /// Creates a new OpenAI client.
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, LLMError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| LLMError::AuthError("API key is not a valid header value".to_string()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(LLMError::NetworkError)?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }

    fn parse_response(response: ChatCompletionResponse) -> Result<ModelResponse, LLMError> {
        let usage = Usage {
            input_tokens: response.usage.prompt_tokens,
            output_tokens: response.usage.completion_tokens,
        };

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse("no choices in response".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                // Some providers return malformed argument strings; degrade
                // to an empty object so the tool can still report the problem.
                let arguments: Value = if call.function.arguments.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&call.function.arguments)
                        .unwrap_or(serde_json::json!({}))
                };

                let id = if call.id.is_empty() {
                    format!("call_{}", Uuid::new_v4())
                } else {
                    call.id
                };

                ToolCallRequest::new(id, call.function.name, arguments)
            })
            .collect();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("length") => FinishReason::MaxTokens,
            _ => FinishReason::Error,
        };

        Ok(ModelResponse {
            content: choice.message.content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, request: ChatRequest) -> Result<ModelResponse, LLMError> {
        let body = ChatRequestBody {
            model: &request.model,
            messages: &request.messages,
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(&request.tools)
            },
            tool_choice: if request.tools.is_empty() {
                None
            } else {
                Some("auto")
            },
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        debug!(model = %request.model, tools = request.tools.len(), "sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(LLMError::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::AuthError(error_text),
                StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimitError(error_text),
                _ => LLMError::ApiError(error_text),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| LLMError::InvalidResponse(format!("{e}: {response_text}")))?;

        Self::parse_response(parsed)
    }
}
