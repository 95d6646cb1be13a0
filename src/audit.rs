//! Per-turn record of tool invocations.
//!
//! A trail is created when a turn starts, filled as tools run, and handed to
//! the caller inside the `TurnResult`. The agent never keeps it around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::ToolInvocationResult;

/// One tool invocation, as the caller will persist or display it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The tool that was invoked
    pub tool: String,
    /// The arguments the model requested (before credential injection)
    pub arguments: Value,
    /// The tool's return value, or null on failure
    pub result: Value,
    /// Whether the invocation succeeded
    pub success: bool,
    /// The failure message, on failure
    pub error: Option<String>,
    /// Wall-clock time at which the call returned
    pub timestamp: DateTime<Utc>,
}

/// Accumulates audit entries in invocation order for one turn.
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one invocation outcome, stamping the current time.
    pub fn record(&mut self, tool: &str, arguments: Value, outcome: &ToolInvocationResult) {
        self.entries.push(AuditEntry {
            tool: tool.to_string(),
            arguments,
            result: outcome.payload.clone().unwrap_or(Value::Null),
            success: outcome.success,
            error: outcome.error_message.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Returns the number of recorded invocations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether any invocation was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the trail, yielding the entries in invocation order.
    pub fn into_entries(self) -> Vec<AuditEntry> {
        self.entries
    }
}
