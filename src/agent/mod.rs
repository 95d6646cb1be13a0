mod turn;

pub use turn::{Agent, AgentConfig, DEFAULT_MAX_TOOL_CALLS, MAX_TOOL_CALLS_APOLOGY, TurnRequest, TurnResult};
