//! Transport Adapter
//!
//! Wraps the duplex text channel to the assistant service. A transport
//! exposes `send(text)` and reports lifecycle events (`Opened`,
//! `MessageReceived`, `Closed`, `Errored`) into the engine's event queue.
//! It owns no UI or conversation state.
//!
//! - `InProcess`: channel loopback for tests and embedding
//! - `WebSocket`: the real client connection (feature `websocket`)
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──► Open ──► Closed
//!      │           └────► Errored
//!      └────────────────► Closed / Errored
//! ```
//!
//! Closed and Errored are terminal: no further events, and `send` is inert.
//! There is no reconnection; a new session needs a new transport.

pub mod config;
pub mod in_process;
mod lifecycle;
pub mod traits;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-exports for convenience
pub use config::{TransportConfig, DEFAULT_URL};
pub use in_process::{InProcessTransport, RemoteEnd};
pub use traits::{ChannelState, Transport, TransportError, TransportEvent};

#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;
