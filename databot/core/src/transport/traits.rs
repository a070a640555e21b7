//! Transport trait and lifecycle types

use thiserror::Error;

/// Lifecycle event emitted by a transport
///
/// A transport emits at most one `Opened`, any number of
/// `MessageReceived` while open, and at most one terminal event
/// (`Closed` or `Errored`). Nothing follows a terminal event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// The channel is ready for traffic
    Opened,
    /// One whole text message from the assistant
    MessageReceived(String),
    /// The channel closed
    Closed,
    /// The channel failed
    Errored(String),
}

impl TransportEvent {
    /// Whether this event ends the channel
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Errored(_))
    }
}

/// Observable channel state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelState {
    /// Handshake in progress
    Connecting = 0,
    /// Ready for traffic
    Open = 1,
    /// Closed normally
    Closed = 2,
    /// Closed by an error
    Errored = 3,
}

impl ChannelState {
    /// Closed and Errored are final
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closed,
            _ => Self::Errored,
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

/// Transport layer errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel is not open
    #[error("Transport not open (state: {0})")]
    NotOpen(ChannelState),

    /// The I/O task is gone
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt exceeded the configured timeout
    #[error("Connection timed out after {0}ms")]
    Timeout(u64),
}

/// A bidirectional text-message channel to the assistant
///
/// Implementations push [`TransportEvent`]s into the engine's event queue
/// from their own I/O task. The methods here are non-blocking and may be
/// called from the engine's task.
pub trait Transport: Send {
    /// Transmit `text` as a single message
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotOpen`] if the channel is not open. The
    /// message is dropped in that case.
    fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Current channel state
    fn state(&self) -> ChannelState;

    /// Begin teardown; emits `Closed` once if the channel was not already
    /// terminal
    fn close(&self);
}
