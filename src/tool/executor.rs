use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::tool::{ToolDescriptor, ToolInvocationResult, ToolRegistry};

/// Default upper bound on a single tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves and runs tool invocations requested by the model.
///
/// Every outcome is normalized into a `ToolInvocationResult`; nothing
/// escapes `execute` as an error, so a misbehaving tool can never take down
/// the turn it runs in.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    tool_timeout: Duration,
}

impl ToolExecutor {
    /// Creates a new tool executor with the default per-call timeout.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_timeout(registry, DEFAULT_TOOL_TIMEOUT)
    }

    /// Creates a new tool executor with an explicit per-call timeout.
    pub fn with_timeout(registry: Arc<ToolRegistry>, tool_timeout: Duration) -> Self {
        Self {
            registry,
            tool_timeout,
        }
    }

    /// Returns the descriptors of every registered tool.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    /// Executes one tool invocation requested by the model.
    ///
    /// The caller's credential is injected under `user_token` unless the
    /// arguments already carry one; with no token, `caller_id` is passed as
    /// `user_id` so the tool can still scope its work. Timeouts, panics and
    /// every `ToolError` kind all come back as failed results.
    pub async fn execute(
        &self,
        tool_name: &str,
        arguments: Value,
        auth_token: Option<&str>,
        caller_id: &str,
    ) -> ToolInvocationResult {
        let tool = match self.registry.get(tool_name) {
            Some(tool) => tool.clone(),
            None => {
                warn!(tool = tool_name, "unknown tool requested by model");
                return ToolInvocationResult::fail(format!("unknown tool: {tool_name}"));
            }
        };

        // Some tools take no arguments; the model may send null for them.
        let mut args = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                warn!(tool = tool_name, args = %other, "non-object tool arguments, ignoring");
                Map::new()
            }
        };

        if !args.contains_key("user_token") {
            match auth_token {
                Some(token) => {
                    args.insert("user_token".to_string(), Value::String(token.to_string()));
                }
                None => {
                    warn!(tool = tool_name, "no auth token supplied, falling back to caller id");
                    args.insert("user_id".to_string(), Value::String(caller_id.to_string()));
                }
            }
        }

        debug!(tool = tool_name, "executing tool");

        let merged = Value::Object(args);
        let handle = tokio::spawn(async move { tool.execute(merged).await });
        let abort = handle.abort_handle();

        match tokio::time::timeout(self.tool_timeout, handle).await {
            Err(_) => {
                abort.abort();
                warn!(tool = tool_name, timeout_secs = self.tool_timeout.as_secs(), "tool call timed out");
                ToolInvocationResult::fail(format!(
                    "tool call timed out after {}s",
                    self.tool_timeout.as_secs()
                ))
            }
            Ok(Err(join_error)) => {
                warn!(tool = tool_name, error = %join_error, "tool task aborted");
                ToolInvocationResult::fail(format!("Internal error: {tool_name} failed unexpectedly"))
            }
            Ok(Ok(Ok(payload))) => {
                info!(tool = tool_name, "tool executed successfully");
                ToolInvocationResult::ok(payload)
            }
            Ok(Ok(Err(error))) => {
                warn!(tool = tool_name, error = %error, "tool reported failure");
                ToolInvocationResult::fail(error.to_string())
            }
        }
    }
}
