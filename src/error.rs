//! Fatal error types for the task-agent library.
//!
//! Only failures that abort a whole turn live here. Tool-level failures are
//! values (`ToolInvocationResult`), not errors, so the model can react to them.

use thiserror::Error;

/// Errors that abort a turn and are surfaced to the caller.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The language-model transport failed; no partial result is fabricated.
    #[error("LLM error: {0}")]
    LLM(#[from] crate::llm::LLMError),

    /// The user message was empty.
    #[error("message must not be empty")]
    EmptyMessage,
}
