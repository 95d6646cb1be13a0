pub mod client;
pub mod openai;

pub use client::{
    ChatRequest, FinishReason, LLMClient, LLMClientBuilder, LLMError, ModelResponse,
    ToolCallRequest, Usage,
};
pub use openai::OpenAIClient;
