//! Builds the message list sent to the model for one turn.
//!
//! Pure function of its inputs: one fixed system message, the caller-owned
//! history verbatim, then the new user message. Nothing here is cached
//! between calls.

use crate::conversation::{ChatMessage, ConversationTurn};

/// System instructions for the task-management assistant.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful task management assistant. You help users manage their TODO tasks through natural language conversation.

You have access to tools that let you list, create, update, delete, and complete tasks.

When users ask you to create tasks:
1. Extract the task title from their message
2. Infer priority from urgency keywords (urgent/asap/critical -> high, maybe/someday -> low, default -> normal)
3. Parse temporal expressions for due dates (tomorrow, next week, Monday, etc.)
4. Create the task using the create_task tool

When users ask about their tasks:
1. Use list_tasks to fetch their current tasks
2. Provide a clear summary organized by priority or due date
3. Highlight overdue tasks or high-priority items

When users ask to modify, complete, or delete tasks:
1. Look up the task's numeric ID with list_tasks first
2. Apply the change with the appropriate tool
3. Confirm the action taken

Always be concise, helpful, and proactive in managing tasks efficiently.";

/// Assembles the context for one model call.
///
/// `history` is borrowed and never mutated; the caller reloads it from
/// durable storage before every turn.
pub fn build_context(
    system_prompt: &str,
    history: &[ConversationTurn],
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.iter().map(ChatMessage::from_turn));
    messages.push(ChatMessage::user(message));
    messages
}
