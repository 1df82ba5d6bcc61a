// ABOUTME: Channel module - owns the duplex transport lifecycle and the
// ABOUTME: fail-fast outbound send path.

mod ws;

pub use ws::WsTransport;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ChannelError;
use crate::session::OutboundFrame;

/// A duplex transport the channel can send frames over.
///
/// Inbound frames are delivered out of band (see [`WsTransport::connect`]);
/// this trait covers the outbound half and shutdown.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one serialized frame.
    async fn send(&self, frame: String) -> Result<(), ChannelError>;

    /// Close the transport.
    async fn close(&self) -> Result<(), ChannelError>;
}

/// Owns at most one active transport for a session.
///
/// `connect` is idempotent while connected; `send` fails fast with
/// [`ChannelError::NotConnected`] and never queues frames. Reconnection is
/// caller-initiated.
#[derive(Default)]
pub struct SessionChannel {
    transport: Arc<RwLock<Option<Arc<dyn Transport>>>>,
}

impl SessionChannel {
    /// Create a channel with no active transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a transport.
    ///
    /// Returns `false` without replacing anything if a transport is already
    /// active; the offered transport is dropped.
    pub async fn connect(&self, transport: Arc<dyn Transport>) -> bool {
        let mut guard = self.transport.write().await;
        if guard.is_some() {
            return false;
        }
        *guard = Some(transport);
        true
    }

    /// Clear the active transport, closing it if one was installed.
    pub async fn disconnect(&self) {
        let transport = self.transport.write().await.take();
        if let Some(transport) = transport {
            if let Err(e) = transport.close().await {
                tracing::debug!(error = %e, "transport close failed");
            }
        }
    }

    /// Whether a transport is currently installed.
    pub async fn is_connected(&self) -> bool {
        self.transport.read().await.is_some()
    }

    /// Serialize and send one frame on the active transport.
    pub async fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError> {
        let transport = {
            let guard = self.transport.read().await;
            guard.clone().ok_or(ChannelError::NotConnected)?
        };
        let serialized = serde_json::to_string(frame)?;
        transport.send(serialized).await
    }
}

impl Clone for SessionChannel {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::Mutex;

    /// Transport that records sent frames.
    struct RecordingTransport {
        frames: Mutex<Vec<String>>,
        closed: Mutex<bool>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                frames: Mutex::new(Vec::new()),
                closed: Mutex::new(false),
            })
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, frame: String) -> Result<(), ChannelError> {
            self.frames.lock().await.push(frame);
            Ok(())
        }

        async fn close(&self) -> Result<(), ChannelError> {
            *self.closed.lock().await = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_without_transport_fails_fast() {
        let channel = SessionChannel::new();
        let result = channel.send(&OutboundFrame::ResponseCreate).await;
        assert!(matches!(result, Err(ChannelError::NotConnected)));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent_while_connected() {
        let channel = SessionChannel::new();
        let first = RecordingTransport::new();
        let second = RecordingTransport::new();

        assert!(channel.connect(first.clone()).await);
        assert!(!channel.connect(second).await);

        channel.send(&OutboundFrame::ResponseCreate).await.unwrap();
        assert_eq!(first.frames.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_clears_and_closes() {
        let channel = SessionChannel::new();
        let transport = RecordingTransport::new();
        channel.connect(transport.clone()).await;

        channel.disconnect().await;

        assert!(!channel.is_connected().await);
        assert!(*transport.closed.lock().await);
        assert!(matches!(
            channel.send(&OutboundFrame::ResponseCreate).await,
            Err(ChannelError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_reconnect_after_disconnect() {
        let channel = SessionChannel::new();
        channel.connect(RecordingTransport::new()).await;
        channel.disconnect().await;

        let replacement = RecordingTransport::new();
        assert!(channel.connect(replacement).await);
        assert!(channel.is_connected().await);
    }
}
