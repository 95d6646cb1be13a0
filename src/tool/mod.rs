pub mod executor;
pub mod registry;
pub mod schema;

pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
pub use schema::to_model_schema;
pub use tool_trait::{DynTool, Tool};
pub use tool_types::{ToolDescriptor, ToolError, ToolInvocationResult};

mod tool_types {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use thiserror::Error;

    /// Description of a tool the model may invoke.
    ///
    /// Defined once per process at startup and shared read-only across all
    /// concurrent turns.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ToolDescriptor {
        /// The name of the tool
        pub name: String,
        /// A description of what the tool does
        pub description: String,
        /// JSON Schema for the tool's parameters
        pub parameters: Value,
    }

    /// The normalized outcome of one tool invocation.
    ///
    /// Exactly one of `payload` and `error_message` is set; failure is a
    /// first-class value fed back to the model, never an exception.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ToolInvocationResult {
        /// Whether the invocation succeeded
        pub success: bool,
        /// The tool's return value, on success
        pub payload: Option<Value>,
        /// A descriptive error message, on failure
        pub error_message: Option<String>,
    }

    impl ToolInvocationResult {
        /// Creates a successful result.
        pub fn ok(payload: Value) -> Self {
            Self {
                success: true,
                payload: Some(payload),
                error_message: None,
            }
        }

        /// Creates a failed result.
        pub fn fail(error: impl Into<String>) -> Self {
            Self {
                success: false,
                payload: None,
                error_message: Some(error.into()),
            }
        }
    }

    /// The closed set of failure kinds a tool may report.
    ///
    /// All of these are non-fatal: the executor maps them to a
    /// `ToolInvocationResult` and the model decides how to recover.
    #[derive(Debug, Error)]
    pub enum ToolError {
        /// Invalid or missing credential
        #[error("Authentication failed: {0}")]
        Authentication(String),
        /// Valid credential lacking permission for the target
        #[error("Access denied: {0}")]
        Authorization(String),
        /// The target entity does not exist
        #[error("Not found: {0}")]
        NotFound(String),
        /// Malformed arguments
        #[error("Invalid input: {0}")]
        Validation(String),
        /// Unexpected internal failure inside the tool
        #[error("Tool execution failed: {0}")]
        Execution(String),
    }
}

mod tool_trait {
    use super::tool_types::{ToolDescriptor, ToolError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    /// A remote capability the model may request during a turn.
    ///
    /// Implementations must not retain cross-call state tied to the identity
    /// of the calling loop instance.
    #[async_trait]
    pub trait Tool: Send + Sync {
        /// Returns the name of the tool.
        fn name(&self) -> &str;
        /// Returns a description of what the tool does.
        fn description(&self) -> &str;
        /// Returns the JSON Schema for the tool's parameters.
        fn parameters(&self) -> Value;

        /// Executes the tool with the merged argument object.
        ///
        /// The executor injects the caller's credential under `user_token`
        /// (or `user_id` as a fallback) before this is called.
        async fn execute(&self, args: Value) -> Result<Value, ToolError>;

        /// Converts the tool to its descriptor.
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters(),
            }
        }
    }

    /// A type alias for a dynamic tool reference.
    pub type DynTool = Arc<dyn Tool>;
}
