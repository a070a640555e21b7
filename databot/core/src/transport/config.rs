//! Transport Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default assistant endpoint
pub const DEFAULT_URL: &str = "ws://localhost:8000/ws";

/// Transport configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// WebSocket endpoint (`ws://` or `wss://`)
    pub url: String,

    /// Connection timeout in milliseconds
    ///
    /// A handshake that does not finish in time ends the channel with
    /// `Errored`.
    pub connect_timeout_ms: u64,

    /// Largest accepted inbound message in bytes
    pub max_message_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            connect_timeout_ms: 5000,
            max_message_size: 1 << 20,
        }
    }
}

impl TransportConfig {
    /// Configuration pointing at `url` with default limits
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Connection timeout as a duration
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
