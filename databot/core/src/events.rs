//! Inbound Events
//!
//! Everything the conversation engine reacts to arrives through one bounded
//! queue: user submissions from the surface and lifecycle events from the
//! transport. The engine consumes them one at a time, in arrival order.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::transport::TransportEvent;

/// An event for the conversation engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationEvent {
    // ========================================================================
    // Surface Events
    // ========================================================================
    /// The user submitted text from the input field
    UserSubmit(String),

    // ========================================================================
    // Transport Events
    // ========================================================================
    /// A lifecycle event from the transport adapter
    Transport(TransportEvent),
}

impl ConversationEvent {
    /// Convenience constructor for a submission
    pub fn submit(text: impl Into<String>) -> Self {
        Self::UserSubmit(text.into())
    }

    /// Short name for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserSubmit(_) => "user_submit",
            Self::Transport(TransportEvent::Opened) => "opened",
            Self::Transport(TransportEvent::MessageReceived(_)) => "message_received",
            Self::Transport(TransportEvent::Closed) => "closed",
            Self::Transport(TransportEvent::Errored(_)) => "errored",
        }
    }
}

impl From<TransportEvent> for ConversationEvent {
    fn from(event: TransportEvent) -> Self {
        Self::Transport(event)
    }
}

/// Errors pushing into the event queue
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The receiving side was dropped
    #[error("event queue closed")]
    Closed,
    /// The queue is at capacity
    #[error("event queue full")]
    Full,
}

/// Producer side of the event queue
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::Sender<ConversationEvent>,
}

impl EventSender {
    /// Push an event, waiting for capacity
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the receiver is gone.
    pub async fn send(&self, event: impl Into<ConversationEvent>) -> Result<(), QueueError> {
        self.tx.send(event.into()).await.map_err(|_| QueueError::Closed)
    }

    /// Push an event without waiting
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] or [`QueueError::Closed`].
    pub fn try_send(&self, event: impl Into<ConversationEvent>) -> Result<(), QueueError> {
        self.tx.try_send(event.into()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Push a user submission
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the receiver is gone.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), QueueError> {
        self.send(ConversationEvent::submit(text)).await
    }

    /// Whether the receiving side has been dropped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the event queue
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<ConversationEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is dropped
    pub async fn recv(&mut self) -> Option<ConversationEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is ready
    pub fn try_recv(&mut self) -> Option<ConversationEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create the inbound event queue
///
/// A capacity of zero is raised to one.
#[must_use]
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}
