//! In-Process Transport
//!
//! Channel-based loopback for tests and embedding. The transport half goes
//! to the engine; the [`RemoteEnd`] plays the assistant.
//!
//! # Usage
//!
//! ```ignore
//! let (tx, mut rx) = event_queue(64);
//! let (transport, mut remote) = InProcessTransport::new_pair(tx);
//! let mut engine = ConversationEngine::new(EngineConfig::default(), surface, transport);
//!
//! remote.open().await;
//! // ... engine.handle_event(rx.recv().await?) ...
//! assert_eq!(remote.drain_sent(), vec!["hi".to_string()]);
//! remote.reply("**hello**").await;
//! ```

use tokio::sync::mpsc;

use super::lifecycle::{Lifecycle, Outbound};
use super::traits::{ChannelState, Transport, TransportError};
use crate::events::EventSender;

/// In-process transport using tokio channels
#[derive(Debug)]
pub struct InProcessTransport {
    lifecycle: Lifecycle,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl InProcessTransport {
    /// Create a connected pair
    ///
    /// The transport starts in `Connecting`; call [`RemoteEnd::open`] to
    /// complete the handshake.
    #[must_use]
    pub fn new_pair(events: EventSender) -> (Self, RemoteEnd) {
        let lifecycle = Lifecycle::new(events);
        let (outbound, sent) = mpsc::unbounded_channel();

        let transport = Self {
            lifecycle: lifecycle.clone(),
            outbound,
        };
        let remote = RemoteEnd {
            lifecycle,
            sent,
            close_requested: false,
        };

        (transport, remote)
    }
}

impl Transport for InProcessTransport {
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

/// The assistant side of an [`InProcessTransport`]
#[derive(Debug)]
pub struct RemoteEnd {
    lifecycle: Lifecycle,
    sent: mpsc::UnboundedReceiver<Outbound>,
    close_requested: bool,
}

impl RemoteEnd {
    /// Complete the handshake; emits `Opened`
    pub async fn open(&self) {
        self.lifecycle.opened().await;
    }

    /// Deliver one assistant message
    pub async fn reply(&self, text: impl Into<String>) {
        self.lifecycle.message(text.into()).await;
    }

    /// Close the channel from the assistant side
    pub async fn close(&self) {
        self.lifecycle.closed().await;
    }

    /// Fail the channel
    pub async fn error(&self, info: impl Into<String>) {
        self.lifecycle.errored(info.into()).await;
    }

    /// Current channel state
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.lifecycle.state()
    }

    /// Wait for the next message sent by the client
    ///
    /// Returns `None` once the client closes or drops the transport.
    pub async fn recv_sent(&mut self) -> Option<String> {
        if self.close_requested {
            return None;
        }
        match self.sent.recv().await {
            Some(Outbound::Text(text)) => Some(text),
            Some(Outbound::Close) | None => {
                self.close_requested = true;
                None
            }
        }
    }

    /// Every message sent by the client so far, without waiting
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = self.sent.try_recv() {
            match frame {
                Outbound::Text(text) => out.push(text),
                Outbound::Close => self.close_requested = true,
            }
        }
        out
    }

    /// Whether the client asked to close
    #[must_use]
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{event_queue, ConversationEvent};
    use crate::transport::TransportEvent;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_send_before_open_is_dropped() {
        let (tx, _rx) = event_queue(8);
        let (transport, mut remote) = InProcessTransport::new_pair(tx);

        assert!(transport.send("early").is_err());
        remote.open().await;
        transport.send("hi").unwrap();

        assert_eq!(remote.drain_sent(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_remote_events_reach_queue() {
        let (tx, mut rx) = event_queue(8);
        let (transport, remote) = InProcessTransport::new_pair(tx);

        remote.open().await;
        remote.reply("hello").await;
        remote.close().await;
        remote.reply("late").await;

        assert_eq!(transport.state(), ChannelState::Closed);
        let mut events = Vec::new();
        while let Some(ConversationEvent::Transport(ev)) = rx.try_recv() {
            events.push(ev);
        }
        assert_eq!(
            events,
            vec![
                TransportEvent::Opened,
                TransportEvent::MessageReceived("hello".into()),
                TransportEvent::Closed,
            ]
        );
    }

    #[tokio::test]
    async fn test_local_close_is_inert_afterwards() {
        let (tx, mut rx) = event_queue(8);
        let (transport, mut remote) = InProcessTransport::new_pair(tx);
        remote.open().await;

        transport.close();
        transport.close();
        assert!(transport.send("after").is_err());

        assert_eq!(remote.recv_sent().await, None);
        assert!(remote.close_requested());

        assert_eq!(
            rx.try_recv(),
            Some(ConversationEvent::Transport(TransportEvent::Opened))
        );
        assert_eq!(
            rx.try_recv(),
            Some(ConversationEvent::Transport(TransportEvent::Closed))
        );
        assert_eq!(rx.try_recv(), None);
    }
}
