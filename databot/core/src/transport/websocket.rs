//! WebSocket Transport
//!
//! Client side of a WebSocket connection to the assistant service. A spawned
//! task owns the socket; it pushes lifecycle events into the engine's queue
//! and writes frames taken from an outbound channel.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};

use super::config::TransportConfig;
use super::lifecycle::{Lifecycle, Outbound};
use super::traits::{ChannelState, Transport, TransportError};
use crate::events::EventSender;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket client transport
#[derive(Debug)]
pub struct WebSocketTransport {
    lifecycle: Lifecycle,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl WebSocketTransport {
    /// Start connecting to `config.url`
    ///
    /// Returns immediately in `Connecting`. The outcome arrives on the event
    /// queue as `Opened` or `Errored`. Must be called inside a tokio runtime.
    #[must_use]
    pub fn connect(config: &TransportConfig, events: EventSender) -> Self {
        let lifecycle = Lifecycle::new(events);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_connection(config.clone(), lifecycle.clone(), outbound_rx));

        Self { lifecycle, outbound }
    }
}

impl Transport for WebSocketTransport {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        self.lifecycle.send(&self.outbound, text)
    }

    fn state(&self) -> ChannelState {
        self.lifecycle.state()
    }

    fn close(&self) {
        if self.lifecycle.closed_now() {
            let _ = self.outbound.send(Outbound::Close);
        }
    }
}

async fn establish(config: &TransportConfig) -> Result<Socket, TransportError> {
    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(config.max_message_size);
    ws_config.max_frame_size = Some(config.max_message_size);

    let connect = connect_async_with_config(config.url.as_str(), Some(ws_config), false);
    match tokio::time::timeout(config.connect_timeout(), connect).await {
        Ok(Ok((socket, response))) => {
            tracing::debug!(status = %response.status(), "handshake complete");
            Ok(socket)
        }
        Ok(Err(e)) => Err(TransportError::ConnectionFailed(e.to_string())),
        Err(_) => Err(TransportError::Timeout(config.connect_timeout_ms)),
    }
}

async fn run_connection(
    config: TransportConfig,
    lifecycle: Lifecycle,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    tracing::info!(url = %config.url, "connecting");

    let socket = match establish(&config).await {
        Ok(socket) => socket,
        Err(e) => {
            lifecycle.errored(e.to_string()).await;
            return;
        }
    };

    let (mut write, mut read) = socket.split();

    // Closed locally while the handshake was running
    if lifecycle.state().is_terminal() {
        let _ = write.send(Message::Close(None)).await;
        return;
    }
    lifecycle.opened().await;

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => lifecycle.message(text).await,
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(len = data.len(), "binary frame ignored");
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "close frame received");
                    // Flushes the queued close reply
                    if let Err(e) = write.close().await {
                        tracing::debug!(error = %e, "close handshake incomplete");
                    }
                    lifecycle.closed().await;
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    lifecycle.errored(e.to_string()).await;
                    break;
                }
                None => {
                    lifecycle.closed().await;
                    break;
                }
            },
            next = outbound.recv() => match next {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        lifecycle.errored(e.to_string()).await;
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    lifecycle.closed().await;
                    break;
                }
            },
        }
    }

    tracing::debug!(state = %lifecycle.state(), "connection task finished");
}
