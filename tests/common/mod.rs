//! Scripted model clients and fake tools for exercising the turn loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use task_agent::{
    ChatRequest, LLMClient, LLMError, ModelResponse, Tool, ToolCallRequest, ToolError,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A model client that replays a fixed script and records every request it
/// receives, so tests can inspect the exact context the loop sent.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<ModelResponse, LLMError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<ModelResponse, LLMError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ChatRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(&self, request: ChatRequest) -> Result<ModelResponse, LLMError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted client ran out of responses")
    }
}

/// A model client that requests the same tool on every call, forever.
pub struct AlwaysToolClient {
    calls: AtomicUsize,
    tool_name: String,
}

impl AlwaysToolClient {
    pub fn new(tool_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            tool_name: tool_name.into(),
        })
    }

    pub fn model_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for AlwaysToolClient {
    async fn complete(&self, _request: ChatRequest) -> Result<ModelResponse, LLMError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelResponse::tool_requests(vec![ToolCallRequest::new(
            format!("call_{n}"),
            self.tool_name.clone(),
            json!({}),
        )]))
    }
}

/// A model client that never answers within a test-sized deadline.
pub struct SlowClient {
    pub delay: Duration,
}

#[async_trait]
impl LLMClient for SlowClient {
    async fn complete(&self, _request: ChatRequest) -> Result<ModelResponse, LLMError> {
        tokio::time::sleep(self.delay).await;
        Ok(ModelResponse::text("too late"))
    }
}

/// A tool that returns a fixed payload and counts its invocations.
pub struct StaticTool {
    name: String,
    payload: Value,
    pub invocations: Arc<AtomicUsize>,
}

impl StaticTool {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "returns a fixed payload"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

/// A tool that always fails with the given error kind.
pub struct ErrTool {
    name: String,
    kind: fn(String) -> ToolError,
    message: String,
}

impl ErrTool {
    pub fn new(
        name: impl Into<String>,
        kind: fn(String) -> ToolError,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            message: message.into(),
        }
    }
}

#[async_trait]
impl Tool for ErrTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "always fails"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        Err((self.kind)(self.message.clone()))
    }
}
