//! # task-agent
//!
//! The stateless execution loop behind a conversational task-management
//! assistant. One call to [`Agent::run_turn`] takes a user message, the
//! prior conversation history and a fixed tool catalogue, drives a bounded
//! negotiation with a language model, and returns the final answer together
//! with an audit trail of every tool invocation.
//!
//! ## Statelessness
//!
//! The agent holds no data whose lifetime exceeds a single turn. History is
//! a plain parameter loaded fresh from durable storage by the caller, the
//! tool registry is frozen at startup and shared read-only, and the audit
//! trail is handed back rather than retained. Any instance can therefore
//! serve any request, and a crash mid-turn loses at most that turn.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use task_agent::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let llm = LLMClientBuilder::new()
//!         .with_api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build_openai()?;
//!
//!     let mut registry = ToolRegistry::new();
//!     // registry.register(Arc::new(MyCreateTaskTool::new(...)));
//!     let registry = Arc::new(registry);
//!
//!     let agent = Agent::with_defaults(llm, registry);
//!
//!     let result = agent
//!         .run_turn(
//!             TurnRequest::new("user-123", "create a task to buy groceries tomorrow")
//!                 .with_history(vec![/* loaded from the database */])
//!                 .with_auth_token("eyJhbGciOi..."),
//!         )
//!         .await?;
//!
//!     println!("{}", result.response);
//!     for entry in &result.tool_calls {
//!         println!("{} -> success={}", entry.tool, entry.success);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod audit;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod tool;

// Re-exports for convenient usage
pub use agent::{Agent, AgentConfig, DEFAULT_MAX_TOOL_CALLS, MAX_TOOL_CALLS_APOLOGY, TurnRequest, TurnResult};
pub use audit::{AuditEntry, AuditTrail};
pub use conversation::{ChatMessage, ConversationTurn, Role, SYSTEM_PROMPT, build_context};
pub use error::AgentError;
pub use llm::{
    ChatRequest, FinishReason, LLMClient, LLMClientBuilder, LLMError, ModelResponse, OpenAIClient,
    ToolCallRequest, Usage,
};
pub use tool::{
    DynTool, Tool, ToolDescriptor, ToolError, ToolExecutor, ToolInvocationResult, ToolRegistry,
    to_model_schema,
};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, TurnRequest, TurnResult};
    pub use crate::conversation::{ConversationTurn, Role};
    pub use crate::error::AgentError;
    pub use crate::llm::{LLMClient, LLMClientBuilder, OpenAIClient};
    pub use crate::tool::{Tool, ToolError, ToolRegistry};
}
