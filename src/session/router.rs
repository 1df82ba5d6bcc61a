// ABOUTME: SessionEventRouter - classifies inbound events and routes them to
// ABOUTME: transcript state, tool execution, or the credential broker.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

use super::event::{CreatedItem, InboundEvent};
use super::frame::OutboundFrame;
use super::state::{ConnectionStatus, Role, SessionState};
use crate::channel::{SessionChannel, WsTransport};
use crate::credential::CredentialBroker;
use crate::error::{BridgeError, ChannelError};
use crate::tool::{Executor, ToolInvocation};

/// Routes one session's inbound event stream.
///
/// Events are classified in arrival order on a single consumption path.
/// Tool execution is dispatched to its own task so the router keeps
/// consuming while calls are in flight; completions correlate back to their
/// originating call id, never to arrival order.
pub struct SessionEventRouter {
    state: Arc<RwLock<SessionState>>,
    executor: Arc<Executor>,
    broker: CredentialBroker,
    channel: SessionChannel,
    in_flight: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl SessionEventRouter {
    /// Create a router for one session.
    pub fn new(executor: Executor, broker: CredentialBroker, channel: SessionChannel) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::new())),
            executor: Arc::new(executor),
            broker,
            channel,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Shared handle to the session state, for display layers.
    pub fn state(&self) -> Arc<RwLock<SessionState>> {
        Arc::clone(&self.state)
    }

    /// Consume an inbound stream until the transport drains, bracketing it
    /// with the connection lifecycle transitions.
    pub async fn run(&self, mut inbound: mpsc::Receiver<String>) {
        self.handle_event(InboundEvent::ConnectionOpened).await;
        while let Some(raw) = inbound.recv().await {
            self.handle_raw(&raw).await;
        }
        self.handle_event(InboundEvent::ConnectionClosed).await;
    }

    /// Connect a WebSocket transport and consume the session until the
    /// peer closes. Reconnection is caller-initiated: call this again after
    /// it returns to establish a fresh connection.
    pub async fn run_ws(&self, url: &str) -> Result<(), BridgeError> {
        if self.channel.is_connected().await {
            return Err(ChannelError::Connection(
                "a transport is already active".to_string(),
            )
            .into());
        }
        self.state
            .write()
            .await
            .set_status(ConnectionStatus::Connecting);
        let (transport, inbound) = match WsTransport::connect(url).await {
            Ok(connected) => connected,
            Err(e) => {
                self.state
                    .write()
                    .await
                    .set_status(ConnectionStatus::Disconnected);
                return Err(e.into());
            }
        };
        self.channel.connect(transport).await;
        self.run(inbound).await;
        Ok(())
    }

    /// Classify and route one raw frame.
    ///
    /// Malformed frames are logged and dropped; they never stall the stream.
    pub async fn handle_raw(&self, raw: &str) {
        match InboundEvent::parse(raw) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => tracing::warn!(error = %e, "dropping malformed inbound frame"),
        }
    }

    /// Route one classified event.
    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::ItemCreated(item) => self.on_item_created(item).await,
            InboundEvent::TranscriptDelta { item_id, delta } => {
                self.state.write().await.append_transcript(&item_id, &delta);
            }
            InboundEvent::TranscriptDone {
                item_id,
                transcript,
            } => {
                self.state.write().await.set_transcript(&item_id, transcript);
            }
            InboundEvent::FunctionCall(invocation) => self.dispatch(invocation).await,
            InboundEvent::TokenUpdate { token } => self.broker.update(token).await,
            InboundEvent::TokenRevoke => self.broker.revoke().await,
            InboundEvent::ConnectionOpened => self.on_connected().await,
            InboundEvent::ConnectionClosed => self.on_disconnected().await,
            InboundEvent::Unknown { kind } => {
                tracing::warn!(kind = %kind, "dropping unknown event kind");
            }
        }
    }

    /// Number of tool calls still in flight.
    pub async fn in_flight(&self) -> usize {
        let mut tasks = self.in_flight.lock().await;
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.len()
    }

    /// Await every in-flight tool call.
    pub async fn drain(&self) {
        let handles: Vec<_> = {
            let mut tasks = self.in_flight.lock().await;
            tasks.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    async fn on_item_created(&self, item: CreatedItem) {
        let mut state = self.state.write().await;
        match item.kind.as_str() {
            "message" => {
                let role = item.role.unwrap_or(Role::Assistant);
                let text = item.text();
                state.push_message(&item.id, role, text);
            }
            "function_call" => {
                state.upsert_function_call(&item.id, &item.call_id, &item.name, &item.arguments);
            }
            other => {
                tracing::debug!(kind = %other, "ignoring conversation item kind");
            }
        }
    }

    /// Spawn execution for a function call without blocking the stream.
    async fn dispatch(&self, invocation: ToolInvocation) {
        {
            let mut tasks = self.in_flight.lock().await;
            tasks.retain(|_, handle| !handle.is_finished());
            if tasks.contains_key(&invocation.call_id) {
                tracing::warn!(call_id = %invocation.call_id, "duplicate call id, ignoring");
                return;
            }
        }

        self.state.write().await.upsert_function_call(
            &invocation.call_id,
            &invocation.call_id,
            &invocation.name,
            &invocation.arguments,
        );

        let call_id = invocation.call_id.clone();
        let executor = Arc::clone(&self.executor);
        let state = Arc::clone(&self.state);
        let channel = self.channel.clone();

        let handle = tokio::spawn(async move {
            let output = executor.execute(&invocation).await;

            state.write().await.complete_function_call(
                &output.call_id,
                output.output.clone(),
                output.is_error,
            );

            // Results that outlive their connection are discarded, never
            // redelivered on a later transport.
            let frame = OutboundFrame::function_call_output(&output);
            match channel.send(&frame).await {
                Ok(()) => {
                    if let Err(e) = channel.send(&OutboundFrame::ResponseCreate).await {
                        tracing::warn!(call_id = %output.call_id, error = %e,
                            "failed to send response continuation");
                    }
                }
                Err(ChannelError::NotConnected) => {
                    tracing::warn!(call_id = %output.call_id,
                        "connection closed before result delivery, discarding");
                }
                Err(e) => {
                    tracing::warn!(call_id = %output.call_id, error = %e,
                        "failed to send tool result");
                }
            }
        });

        self.in_flight.lock().await.insert(call_id, handle);
    }

    async fn on_connected(&self) {
        self.state.write().await.set_status(ConnectionStatus::Connected);

        // Single hook point for credential replay: a token installed while
        // disconnected is delivered as soon as the transport is live.
        if let Some(token) = self.broker.token().await {
            if let Err(e) = self.channel.send(&OutboundFrame::TokenUpdate { token }).await {
                tracing::warn!(error = %e, "failed to replay credential on connect");
            }
        }
    }

    async fn on_disconnected(&self) {
        self.state
            .write()
            .await
            .set_status(ConnectionStatus::Disconnected);
        // Clear the transport so a new connection can be installed.
        // In-flight tool calls keep running; their sends fail NotConnected.
        self.channel.disconnect().await;
    }
}
