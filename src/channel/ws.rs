// ABOUTME: WebSocket transport - connects the session channel to the
// ABOUTME: upstream endpoint over tokio-tungstenite.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::Transport;
use crate::error::ChannelError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Duplex WebSocket transport.
///
/// Outbound frames go through [`Transport::send`]; inbound text frames are
/// forwarded to the receiver returned by [`WsTransport::connect`]. When the
/// peer closes or the stream errors, the receiver drains and then yields
/// `None`, which the session loop turns into a `connection.closed` event.
pub struct WsTransport {
    sink: Mutex<WsSink>,
    reader_handle: Mutex<Option<JoinHandle<()>>>,
}

impl WsTransport {
    /// Connect to a WebSocket endpoint.
    ///
    /// Returns the transport and the inbound frame receiver.
    pub async fn connect(
        url: &str,
    ) -> Result<(Arc<Self>, mpsc::Receiver<String>), ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        let (sink, mut source) = stream.split();
        let (inbound_tx, inbound_rx) = mpsc::channel(64);

        let reader_handle = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "websocket read failed");
                        break;
                    }
                }
            }
        });

        let transport = Arc::new(Self {
            sink: Mutex::new(sink),
            reader_handle: Mutex::new(Some(reader_handle)),
        });

        Ok((transport, inbound_rx))
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, frame: String) -> Result<(), ChannelError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(frame))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn close(&self) -> Result<(), ChannelError> {
        {
            let mut sink = self.sink.lock().await;
            let _ = sink.send(Message::Close(None)).await;
        }

        if let Some(handle) = self.reader_handle.lock().await.take() {
            handle.abort();
        }

        Ok(())
    }
}
