// ABOUTME: Tests for the SessionEventRouter - classification, dispatch,
// ABOUTME: credential sideband, and connection lifecycle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::*;
use crate::channel::{SessionChannel, Transport};
use crate::credential::CredentialBroker;
use crate::error::ChannelError;
use crate::tool::{Executor, Registry, Tool, ToolResult};

/// Transport that records every serialized frame it is asked to send.
struct RecordingTransport {
    frames: Mutex<Vec<serde_json::Value>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(Vec::new()),
        })
    }

    async fn frames(&self) -> Vec<serde_json::Value> {
        self.frames.lock().await.clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, frame: String) -> Result<(), ChannelError> {
        let value = serde_json::from_str(&frame)?;
        self.frames.lock().await.push(value);
        Ok(())
    }

    async fn close(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Stub weather tool with a configurable delay.
struct StubWeatherTool {
    delay: Duration,
    reply: &'static str,
}

#[async_trait]
impl Tool for StubWeatherTool {
    fn name(&self) -> &str {
        "get_weather_from_coords"
    }

    fn description(&self) -> &str {
        "Get the current weather"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "latitude": { "type": "number" },
                "longitude": { "type": "number" }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(ToolResult::text(self.reply))
    }
}

async fn router_with_tools(
    tools: Vec<Box<dyn Tool>>,
) -> (SessionEventRouter, Arc<RecordingTransport>, CredentialBroker) {
    let registry = Registry::new();
    for tool in tools {
        registry.register_arc(Arc::from(tool)).await.unwrap();
    }

    let broker = CredentialBroker::new();
    let channel = SessionChannel::new();
    let transport = RecordingTransport::new();
    channel.connect(transport.clone()).await;

    let router = SessionEventRouter::new(Executor::new(registry), broker.clone(), channel);
    (router, transport, broker)
}

#[tokio::test]
async fn test_function_call_event_yields_framed_output() {
    let (router, transport, _) = router_with_tools(vec![Box::new(StubWeatherTool {
        delay: Duration::ZERO,
        reply: r#"{"temp":15}"#,
    })])
    .await;

    router
        .handle_raw(
            r#"{"type":"response.function_call_arguments.done","call_id":"c1","name":"get_weather_from_coords","arguments":"{\"latitude\":10,\"longitude\":20}"}"#,
        )
        .await;
    router.drain().await;

    let frames = transport.frames().await;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["type"], "conversation.item.create");
    assert_eq!(frames[0]["item"]["type"], "function_call_output");
    assert_eq!(frames[0]["item"]["call_id"], "c1");
    assert_eq!(frames[0]["item"]["output"], r#"{"temp":15}"#);
    assert_eq!(frames[1]["type"], "response.create");

    // The function-call item carries its result in place.
    let state = router.state();
    let state = state.read().await;
    match &state.items()[0] {
        ConversationItem::FunctionCall { output, status, .. } => {
            assert_eq!(output.as_deref(), Some(r#"{"temp":15}"#));
            assert_eq!(*status, CallStatus::Completed);
        }
        other => panic!("Expected function call item, got {:?}", other),
    }
}

#[tokio::test]
async fn test_token_sideband_reaches_broker_not_state() {
    let (router, _, broker) = router_with_tools(vec![]).await;

    router
        .handle_raw(r#"{"type":"google.token.update","token":"tok1"}"#)
        .await;
    assert_eq!(broker.token().await.as_deref(), Some("tok1"));

    router
        .handle_raw(r#"{"type":"google.token.revoke"}"#)
        .await;
    assert_eq!(broker.token().await, None);

    let state = router.state();
    assert!(state.read().await.items().is_empty());
}

#[tokio::test]
async fn test_unknown_and_malformed_events_are_dropped() {
    let (router, transport, _) = router_with_tools(vec![]).await;

    router
        .handle_raw(r#"{"type":"response.future.kind","x":1}"#)
        .await;
    router.handle_raw("not even json").await;
    // A recognized kind missing required fields is dropped too.
    router
        .handle_raw(r#"{"type":"response.audio_transcript.delta"}"#)
        .await;

    let state = router.state();
    assert!(state.read().await.items().is_empty());
    assert!(transport.frames().await.is_empty());

    // Subsequent events are still processed.
    router
        .handle_raw(
            r#"{"type":"response.audio_transcript.delta","item_id":"i1","delta":"still alive"}"#,
        )
        .await;
    assert_eq!(state.read().await.items().len(), 1);
}

#[tokio::test]
async fn test_connect_replays_active_credential() {
    let (router, transport, broker) = router_with_tools(vec![]).await;
    broker.update("tok-live").await;

    router.handle_event(InboundEvent::ConnectionOpened).await;

    let frames = transport.frames().await;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "google.token.update");
    assert_eq!(frames[0]["token"], "tok-live");

    let state = router.state();
    assert_eq!(state.read().await.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn test_connect_without_credential_sends_nothing() {
    let (router, transport, _) = router_with_tools(vec![]).await;

    router.handle_event(InboundEvent::ConnectionOpened).await;

    assert!(transport.frames().await.is_empty());
}

#[tokio::test]
async fn test_result_after_close_is_discarded() {
    let (router, transport, _) = router_with_tools(vec![Box::new(StubWeatherTool {
        delay: Duration::from_millis(50),
        reply: r#"{"temp":3}"#,
    })])
    .await;

    router
        .handle_raw(
            r#"{"type":"response.function_call_arguments.done","call_id":"c9","name":"get_weather_from_coords","arguments":"{\"latitude\":1,\"longitude\":2}"}"#,
        )
        .await;
    router.handle_event(InboundEvent::ConnectionClosed).await;
    router.drain().await;

    // Execution still completed and landed in state, but nothing was sent.
    assert!(transport.frames().await.is_empty());
    let state = router.state();
    let state = state.read().await;
    assert_eq!(state.status(), ConnectionStatus::Disconnected);
    match &state.items()[0] {
        ConversationItem::FunctionCall { output, .. } => assert!(output.is_some()),
        other => panic!("Expected function call item, got {:?}", other),
    }
}

#[tokio::test]
async fn test_out_of_order_completions_correlate_by_call_id() {
    let (router, transport, _) = router_with_tools(vec![
        Box::new(StubWeatherTool {
            delay: Duration::from_millis(50),
            reply: r#"{"temp":-1}"#,
        }),
        Box::new(FastTool),
    ])
    .await;

    router
        .handle_raw(
            r#"{"type":"response.function_call_arguments.done","call_id":"A","name":"get_weather_from_coords","arguments":"{\"latitude\":1,\"longitude\":2}"}"#,
        )
        .await;
    router
        .handle_raw(
            r#"{"type":"response.function_call_arguments.done","call_id":"B","name":"fast","arguments":"{}"}"#,
        )
        .await;
    router.drain().await;

    let frames = transport.frames().await;
    let outputs: Vec<_> = frames
        .iter()
        .filter(|f| f["type"] == "conversation.item.create")
        .collect();
    assert_eq!(outputs.len(), 2);

    // B resolves first, but each output carries its own call id.
    assert_eq!(outputs[0]["item"]["call_id"], "B");
    assert_eq!(outputs[0]["item"]["output"], "fast done");
    assert_eq!(outputs[1]["item"]["call_id"], "A");
    assert_eq!(outputs[1]["item"]["output"], r#"{"temp":-1}"#);
}

#[tokio::test]
async fn test_duplicate_call_id_in_flight_is_ignored() {
    let (router, transport, _) = router_with_tools(vec![Box::new(StubWeatherTool {
        delay: Duration::from_millis(50),
        reply: r#"{"temp":0}"#,
    })])
    .await;

    let event = r#"{"type":"response.function_call_arguments.done","call_id":"dup","name":"get_weather_from_coords","arguments":"{\"latitude\":1,\"longitude\":2}"}"#;
    router.handle_raw(event).await;
    router.handle_raw(event).await;
    assert_eq!(router.in_flight().await, 1);
    router.drain().await;

    let outputs: Vec<_> = transport
        .frames()
        .await
        .into_iter()
        .filter(|f| f["type"] == "conversation.item.create")
        .collect();
    assert_eq!(outputs.len(), 1);
}

#[tokio::test]
async fn test_unknown_tool_call_fails_but_still_answers() {
    let (router, transport, _) = router_with_tools(vec![]).await;

    router
        .handle_raw(
            r#"{"type":"response.function_call_arguments.done","call_id":"c3","name":"no_such_tool","arguments":"{}"}"#,
        )
        .await;
    router.drain().await;

    let frames = transport.frames().await;
    assert_eq!(frames[0]["type"], "conversation.item.create");
    assert_eq!(frames[0]["item"]["call_id"], "c3");
    let payload: serde_json::Value =
        serde_json::from_str(frames[0]["item"]["output"].as_str().unwrap()).unwrap();
    assert_eq!(payload["error"], "unknown tool");

    let state = router.state();
    let state = state.read().await;
    match &state.items()[0] {
        ConversationItem::FunctionCall { status, .. } => {
            assert_eq!(*status, CallStatus::Failed);
        }
        other => panic!("Expected function call item, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transcript_events_fold_into_items() {
    let (router, _, _) = router_with_tools(vec![]).await;

    router
        .handle_raw(
            r#"{"type":"conversation.item.created","item":{"id":"i1","type":"message","role":"user","content":[{"type":"input_text","text":"book a meeting"}]}}"#,
        )
        .await;
    router
        .handle_raw(
            r#"{"type":"response.audio_transcript.delta","item_id":"i2","delta":"Sure, "}"#,
        )
        .await;
    router
        .handle_raw(
            r#"{"type":"response.audio_transcript.done","item_id":"i2","transcript":"Sure, booking it now."}"#,
        )
        .await;

    let state = router.state();
    let state = state.read().await;
    assert_eq!(state.items().len(), 2);
    match &state.items()[1] {
        ConversationItem::Message { content, role, .. } => {
            assert_eq!(content, "Sure, booking it now.");
            assert_eq!(*role, Role::Assistant);
        }
        other => panic!("Expected message item, got {:?}", other),
    }
}

/// Tool that resolves immediately, used to race slower calls.
struct FastTool;

#[async_trait]
impl Tool for FastTool {
    fn name(&self) -> &str {
        "fast"
    }

    fn description(&self) -> &str {
        "Resolves immediately"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        Ok(ToolResult::text("fast done"))
    }
}
