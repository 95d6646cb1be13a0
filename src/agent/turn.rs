use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditTrail};
use crate::conversation::{ChatMessage, ConversationTurn, SYSTEM_PROMPT, build_context};
use crate::error::AgentError;
use crate::llm::{ChatRequest, LLMClient, LLMError};
use crate::tool::{ToolExecutor, ToolRegistry, to_model_schema};

/// Default hard bound on tool executions within one turn.
pub const DEFAULT_MAX_TOOL_CALLS: usize = 10;

/// The response returned when a turn hits its tool-call bound.
pub const MAX_TOOL_CALLS_APOLOGY: &str = "I apologize, but I've reached the maximum number of \
tool calls. Please try rephrasing your request or breaking it into smaller steps.";

/// Configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// The model to use
    pub model: String,
    /// The system prompt
    pub system_prompt: String,
    /// Maximum tokens to generate per model call
    pub max_tokens: u32,
    /// Optional temperature
    pub temperature: Option<f32>,
    /// Deadline for each model call; exceeding it is fatal to the turn
    pub llm_timeout: Duration,
    /// Deadline for each tool call; exceeding it is a recoverable tool failure
    pub tool_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: 2000,
            temperature: Some(0.7),
            llm_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

/// Everything needed to run one turn. Supplied fresh by the caller; the
/// agent caches none of it.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// The acting principal; used as a fallback identity when no token is set
    pub caller_id: String,
    /// The new user utterance, non-empty
    pub message: String,
    /// Prior turns, loaded fresh from durable storage by the caller
    pub history: Vec<ConversationTurn>,
    /// Optional credential forwarded unmodified into every tool invocation
    pub auth_token: Option<String>,
    /// Hard bound on tool executions in this turn
    pub max_tool_calls: usize,
}

impl TurnRequest {
    /// Creates a request with an empty history and the default tool bound.
    pub fn new(caller_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            message: message.into(),
            history: Vec::new(),
            auth_token: None,
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
        }
    }

    /// Sets the conversation history.
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    /// Sets the credential to forward into tool invocations.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Overrides the tool-call bound.
    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }
}

/// The outcome of one turn. Ownership transfers entirely to the caller,
/// which is responsible for persisting the response and the audit trail.
#[derive(Debug, Serialize)]
pub struct TurnResult {
    /// The assistant's final text
    pub response: String,
    /// Audit trail of every tool invocation, in execution order
    pub tool_calls: Vec<AuditEntry>,
    /// Number of tool invocations executed
    pub total_tool_calls: usize,
    /// The model that produced the response
    pub model: String,
}

/// The stateless agent execution loop.
///
/// Holds only process-wide immutable collaborators: the model client, the
/// tool executor over the frozen registry, and configuration. No field ever
/// refers to a conversation, so any instance can serve any request, and
/// concurrent turns share nothing mutable.
#[derive(Clone)]
pub struct Agent {
    llm: Arc<dyn LLMClient>,
    executor: ToolExecutor,
    config: AgentConfig,
}

impl Agent {
    /// Creates a new agent.
    pub fn new(llm: Arc<dyn LLMClient>, registry: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        let executor = ToolExecutor::with_timeout(registry, config.tool_timeout);
        Self {
            llm,
            executor,
            config,
        }
    }

    /// Creates a new agent with default configuration.
    pub fn with_defaults(llm: Arc<dyn LLMClient>, registry: Arc<ToolRegistry>) -> Self {
        Self::new(llm, registry, AgentConfig::default())
    }

    /// Runs one complete turn: repeated model calls and tool executions
    /// until the model produces a final answer or the tool bound is hit.
    ///
    /// Tool failures are fed back to the model as values and never abort the
    /// turn. Only transport-level model failures surface as `Err`.
    pub async fn run_turn(&self, request: TurnRequest) -> Result<TurnResult, AgentError> {
        if request.message.trim().is_empty() {
            return Err(AgentError::EmptyMessage);
        }

        info!(
            caller_id = %request.caller_id,
            history_len = request.history.len(),
            model = %self.config.model,
            "starting turn"
        );

        let tool_schemas = to_model_schema(&self.executor.descriptors());
        let mut messages = build_context(&self.config.system_prompt, &request.history, &request.message);
        let mut trail = AuditTrail::new();
        let mut iteration = 0usize;

        loop {
            iteration += 1;
            debug!(iteration, context_len = messages.len(), "calling model");

            let chat = ChatRequest {
                model: self.config.model.clone(),
                messages: messages.clone(),
                tools: tool_schemas.clone(),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            };

            let response = tokio::time::timeout(self.config.llm_timeout, self.llm.complete(chat))
                .await
                .map_err(|_| LLMError::Timeout(self.config.llm_timeout))??;

            if response.tool_calls.is_empty() {
                let text = response.content.unwrap_or_default();
                info!(
                    caller_id = %request.caller_id,
                    iterations = iteration,
                    tool_calls = trail.len(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "turn completed"
                );
                return Ok(self.finish(text, trail));
            }

            debug!(count = response.tool_calls.len(), iteration, "model requested tool calls");

            messages.push(ChatMessage::assistant_tool_calls(
                response.content.clone(),
                response
                    .tool_calls
                    .iter()
                    .map(|call| (call.id.clone(), call.name.clone(), call.arguments.clone())),
            ));

            for call in response.tool_calls {
                if trail.len() >= request.max_tool_calls {
                    return Ok(self.abort(&request, trail));
                }

                let outcome = self
                    .executor
                    .execute(
                        &call.name,
                        call.arguments.clone(),
                        request.auth_token.as_deref(),
                        &request.caller_id,
                    )
                    .await;

                messages.push(ChatMessage::tool_result(&call.id, &outcome));
                trail.record(&call.name, call.arguments, &outcome);
            }

            if trail.len() >= request.max_tool_calls {
                return Ok(self.abort(&request, trail));
            }
        }
    }

    fn finish(&self, response: String, trail: AuditTrail) -> TurnResult {
        let tool_calls = trail.into_entries();
        TurnResult {
            response,
            total_tool_calls: tool_calls.len(),
            tool_calls,
            model: self.config.model.clone(),
        }
    }

    fn abort(&self, request: &TurnRequest, trail: AuditTrail) -> TurnResult {
        warn!(
            caller_id = %request.caller_id,
            max_tool_calls = request.max_tool_calls,
            "tool-call bound reached, aborting turn"
        );
        self.finish(MAX_TOOL_CALLS_APOLOGY.to_string(), trail)
    }
}
