pub mod context;

pub use context::{SYSTEM_PROMPT, build_context};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::ToolInvocationResult;

/// One prior turn of the conversation, supplied fresh by the caller on every
/// invocation. The loop only borrows these for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced this turn
    pub role: Role,
    /// The text of the turn
    pub content: String,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user message
    User,
    /// Assistant message
    Assistant,
}

/// A chat message in the shape the model API expects.
///
/// Covers all four wire roles: system, user, assistant (with or without tool
/// calls), and tool results keyed by `tool_call_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Wire role: "system", "user", "assistant" or "tool"
    pub role: String,
    /// Text content; empty for assistant messages that only carry tool calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool invocations requested by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallPayload>>,
    /// For tool-role messages, the id of the call this result answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// An assistant tool call in the model's function-calling envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallPayload {
    /// Model-assigned call id
    pub id: String,
    /// Always "function"
    #[serde(rename = "type")]
    pub call_type: String,
    /// The requested function
    pub function: FunctionPayload,
}

/// The function half of a tool call payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionPayload {
    /// Tool name
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates an assistant message carrying tool call requests.
    pub fn assistant_tool_calls(
        content: Option<String>,
        calls: impl IntoIterator<Item = (String, String, Value)>,
    ) -> Self {
        let tool_calls = calls
            .into_iter()
            .map(|(id, name, arguments)| ToolCallPayload {
                id,
                call_type: "function".to_string(),
                function: FunctionPayload {
                    name,
                    arguments: arguments.to_string(),
                },
            })
            .collect();

        Self {
            role: "assistant".to_string(),
            content: Some(content.unwrap_or_default()),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Creates a tool-role message carrying one invocation outcome.
    ///
    /// Successful results are serialized payload JSON; failures carry the
    /// error message so the model can adapt its next action.
    pub fn tool_result(tool_call_id: impl Into<String>, outcome: &ToolInvocationResult) -> Self {
        let content = if outcome.success {
            outcome
                .payload
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "null".to_string())
        } else {
            outcome
                .error_message
                .clone()
                .unwrap_or_else(|| "tool execution failed".to_string())
        };

        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Converts a caller-supplied history turn into a wire message.
    pub fn from_turn(turn: &ConversationTurn) -> Self {
        match turn.role {
            Role::User => Self::user(turn.content.clone()),
            Role::Assistant => Self::assistant(turn.content.clone()),
        }
    }
}
