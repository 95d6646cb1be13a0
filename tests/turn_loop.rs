//! End-to-end tests of the turn loop against scripted model clients.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;

use common::{AlwaysToolClient, ErrTool, ScriptedClient, SlowClient, StaticTool, init_tracing};
use task_agent::{
    Agent, AgentConfig, AgentError, ConversationTurn, MAX_TOOL_CALLS_APOLOGY, ModelResponse,
    ToolCallRequest, ToolError, ToolRegistry, TurnRequest,
};

fn registry_with(tools: Vec<task_agent::DynTool>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool);
    }
    Arc::new(registry)
}

#[tokio::test]
async fn create_task_scenario_produces_confirmation_and_audit() -> anyhow::Result<()> {
    init_tracing();

    let create_task = StaticTool::new(
        "create_task",
        json!({"id": 7, "title": "Call the dentist", "priority": "high"}),
    );
    let client = ScriptedClient::new(vec![
        Ok(ModelResponse::tool_requests(vec![ToolCallRequest::new(
            "call_1",
            "create_task",
            json!({"title": "Call the dentist", "priority": "high", "due_date": "tomorrow"}),
        )])),
        Ok(ModelResponse::text(
            "I've created a high priority task \"Call the dentist\" due tomorrow.",
        )),
    ]);

    let agent = Agent::with_defaults(client.clone(), registry_with(vec![Arc::new(create_task)]));
    let result = agent
        .run_turn(
            TurnRequest::new("user-1", "create a high priority task to call the dentist tomorrow")
                .with_auth_token("jwt-abc"),
        )
        .await?;

    assert_eq!(result.total_tool_calls, 1);
    assert_eq!(result.tool_calls.len(), 1);
    assert!(result.tool_calls[0].success);
    assert_eq!(result.tool_calls[0].tool, "create_task");
    assert_eq!(result.tool_calls[0].arguments["title"], "Call the dentist");
    assert_eq!(result.tool_calls[0].result["id"], 7);
    assert!(result.response.contains("Call the dentist"));
    assert_eq!(result.model, "gpt-4o");

    // The second model call must have seen the assistant tool-call message
    // followed by the tool result.
    let second = client.request(1);
    let roles: Vec<&str> = second.messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "tool"]);
    let tool_msg = &second.messages[3];
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    assert!(tool_msg.content.as_ref().unwrap().contains("\"id\":7"));
    Ok(())
}

#[tokio::test]
async fn tool_not_found_is_reported_not_raised() -> anyhow::Result<()> {
    init_tracing();

    let delete_task = ErrTool::new("delete_task", ToolError::NotFound, "task 999 not found");
    let client = ScriptedClient::new(vec![
        Ok(ModelResponse::tool_requests(vec![ToolCallRequest::new(
            "call_1",
            "delete_task",
            json!({"task_id": 999}),
        )])),
        Ok(ModelResponse::text(
            "I couldn't find task 999. It may already have been deleted.",
        )),
    ]);

    let agent = Agent::with_defaults(client, registry_with(vec![Arc::new(delete_task)]));
    let result = agent
        .run_turn(TurnRequest::new("user-1", "delete task 999"))
        .await?;

    assert_eq!(result.total_tool_calls, 1);
    assert!(!result.tool_calls[0].success);
    assert!(result.tool_calls[0].error.as_ref().unwrap().contains("not found"));
    assert_eq!(result.tool_calls[0].result, serde_json::Value::Null);
    assert!(result.response.contains("couldn't find"));
    Ok(())
}

#[tokio::test]
async fn every_tool_failure_kind_completes_the_turn() {
    init_tracing();

    let kinds: Vec<fn(String) -> ToolError> = vec![
        ToolError::Authentication,
        ToolError::Authorization,
        ToolError::NotFound,
        ToolError::Validation,
        ToolError::Execution,
    ];

    for kind in kinds {
        let tool = ErrTool::new("broken", kind, "nope");
        let client = ScriptedClient::new(vec![
            Ok(ModelResponse::tool_requests(vec![ToolCallRequest::new(
                "call_1",
                "broken",
                json!({}),
            )])),
            Ok(ModelResponse::text("Something went wrong with that tool.")),
        ]);

        let agent = Agent::with_defaults(client, registry_with(vec![Arc::new(tool)]));
        let result = agent
            .run_turn(TurnRequest::new("user-1", "do the thing"))
            .await
            .expect("tool failure must not escalate");

        assert!(!result.tool_calls[0].success);
        assert!(result.tool_calls[0].error.is_some());
    }
}

#[tokio::test]
async fn runaway_model_is_bounded_at_max_tool_calls() {
    init_tracing();

    let counter_tool = StaticTool::new("count", json!({"ok": true}));
    let invocations = counter_tool.invocations.clone();
    let client = AlwaysToolClient::new("count");

    let agent = Agent::with_defaults(client.clone(), registry_with(vec![Arc::new(counter_tool)]));
    let result = agent
        .run_turn(TurnRequest::new("user-1", "loop forever").with_max_tool_calls(10))
        .await
        .expect("bound is not an error");

    assert_eq!(result.total_tool_calls, 10);
    assert_eq!(invocations.load(Ordering::SeqCst), 10);
    assert_eq!(result.response, MAX_TOOL_CALLS_APOLOGY);
    // The loop must not go back to the model after the bound is hit.
    assert_eq!(client.model_calls(), 10);
}

#[tokio::test]
async fn bound_is_enforced_mid_batch() {
    init_tracing();

    let counter_tool = StaticTool::new("count", json!({"ok": true}));
    let invocations = counter_tool.invocations.clone();
    let client = ScriptedClient::new(vec![Ok(ModelResponse::tool_requests(vec![
        ToolCallRequest::new("call_1", "count", json!({})),
        ToolCallRequest::new("call_2", "count", json!({})),
        ToolCallRequest::new("call_3", "count", json!({})),
    ]))]);

    let agent = Agent::with_defaults(client, registry_with(vec![Arc::new(counter_tool)]));
    let result = agent
        .run_turn(TurnRequest::new("user-1", "three calls").with_max_tool_calls(2))
        .await
        .unwrap();

    assert_eq!(result.total_tool_calls, 2);
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(result.response, MAX_TOOL_CALLS_APOLOGY);
}

#[tokio::test]
async fn tool_results_keep_request_order() -> anyhow::Result<()> {
    init_tracing();

    let alpha = StaticTool::new("alpha", json!({"from": "alpha"}));
    let beta = StaticTool::new("beta", json!({"from": "beta"}));
    let client = ScriptedClient::new(vec![
        Ok(ModelResponse::tool_requests(vec![
            ToolCallRequest::new("call_a", "alpha", json!({})),
            ToolCallRequest::new("call_b", "beta", json!({})),
        ])),
        Ok(ModelResponse::text("done")),
    ]);

    let agent = Agent::with_defaults(
        client.clone(),
        registry_with(vec![Arc::new(alpha), Arc::new(beta)]),
    );
    let result = agent.run_turn(TurnRequest::new("user-1", "run both")).await?;

    let order: Vec<&str> = result.tool_calls.iter().map(|e| e.tool.as_str()).collect();
    assert_eq!(order, vec!["alpha", "beta"]);

    // The next model call sees alpha's result before beta's.
    let second = client.request(1);
    let tool_ids: Vec<String> = second
        .messages
        .iter()
        .filter_map(|m| m.tool_call_id.clone())
        .collect();
    assert_eq!(tool_ids, vec!["call_a", "call_b"]);
    Ok(())
}

#[tokio::test]
async fn llm_transport_failure_is_fatal() {
    init_tracing();

    let client = ScriptedClient::new(vec![Err(task_agent::LLMError::ApiError(
        "upstream unavailable".to_string(),
    ))]);
    let agent = Agent::with_defaults(client, registry_with(vec![]));

    let err = agent
        .run_turn(TurnRequest::new("user-1", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::LLM(_)));
}

#[tokio::test]
async fn model_call_timeout_is_fatal() {
    init_tracing();

    let config = AgentConfig {
        llm_timeout: Duration::from_millis(20),
        ..AgentConfig::default()
    };
    let agent = Agent::new(
        Arc::new(SlowClient {
            delay: Duration::from_secs(5),
        }),
        registry_with(vec![]),
        config,
    );

    let err = agent
        .run_turn(TurnRequest::new("user-1", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AgentError::LLM(task_agent::LLMError::Timeout(_))
    ));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    init_tracing();

    let client = ScriptedClient::new(vec![]);
    let agent = Agent::with_defaults(client, registry_with(vec![]));

    let err = agent
        .run_turn(TurnRequest::new("user-1", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::EmptyMessage));
}

fn scripted_second_turn() -> Arc<ScriptedClient> {
    ScriptedClient::new(vec![Ok(ModelResponse::text("You have 1 task: buy milk."))])
}

#[tokio::test]
async fn fresh_instance_is_indistinguishable_from_reused_one() -> anyhow::Result<()> {
    init_tracing();

    // Turn 1 on some instance produced a response; the caller persisted it.
    let history = vec![
        ConversationTurn::user("add a task to buy milk"),
        ConversationTurn::assistant("Added \"buy milk\" to your list."),
    ];

    // Same follow-up, once on a reused agent and once on a brand new one,
    // with history reconstructed fresh from the caller's store both times.
    let reused_client = scripted_second_turn();
    let reused = Agent::with_defaults(reused_client, registry_with(vec![]));
    let first = reused
        .run_turn(TurnRequest::new("user-1", "what's on my list?").with_history(history.clone()))
        .await?;

    let fresh_client = scripted_second_turn();
    let fresh = Agent::with_defaults(fresh_client, registry_with(vec![]));
    let second = fresh
        .run_turn(TurnRequest::new("user-1", "what's on my list?").with_history(history))
        .await?;

    assert_eq!(first.response, second.response);
    assert_eq!(first.total_tool_calls, second.total_tool_calls);
    assert_eq!(first.model, second.model);
    Ok(())
}

#[tokio::test]
async fn concurrent_turns_share_nothing() {
    init_tracing();

    // Two turns for the same conversation racing on one agent: each carries
    // its own history and trail, so both complete independently.
    let client = ScriptedClient::new(vec![
        Ok(ModelResponse::text("answer one")),
        Ok(ModelResponse::text("answer two")),
    ]);
    let agent = Agent::with_defaults(client, registry_with(vec![]));

    let turn_a = agent.run_turn(TurnRequest::new("user-1", "first question"));
    let turn_b = agent.run_turn(TurnRequest::new("user-1", "second question"));
    let results = futures::future::join_all(vec![turn_a, turn_b]).await;

    let mut responses: Vec<String> = results
        .into_iter()
        .map(|r| r.expect("both turns complete").response)
        .collect();
    responses.sort();
    assert_eq!(responses, vec!["answer one", "answer two"]);
}
