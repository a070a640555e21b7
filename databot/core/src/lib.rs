//! Databot Core - Headless Conversation Engine
//!
//! This crate holds everything the databot client needs to hold a
//! conversation with a remote assistant, independent of how the conversation
//! is shown. A terminal UI, a web page or a test harness all plug in through
//! the same two seams.
//!
//! # Architecture
//!
//! ```text
//!   PresentationSurface                     Transport
//!  (TUI, headless, ...)           (WebSocket, in-process)
//!          ▲                                 │  ▲
//!          │ append / typing /               │  │ send(text)
//!          │ input enabled                   │  │
//!          │                  ConversationEvent │
//!  ┌───────┴─────────────────────────────────▼──┴──────┐
//!  │               ConversationEngine                   │
//!  │  ┌───────────┐  ┌──────────────┐  ┌─────────────┐  │
//!  │  │ mode /    │  │   Typing     │  │    Text     │  │
//!  │  │ pending   │  │  Indicator   │  │  Formatter  │  │
//!  │  └───────────┘  └──────────────┘  └─────────────┘  │
//!  └────────────────────────────────────────────────────┘
//!          ▲
//!          │ one event at a time
//!     EventQueue  ◄── user submissions + transport lifecycle
//! ```
//!
//! # Key Types
//!
//! - [`ConversationEngine`]: the conversation state machine
//! - [`ConversationEvent`]: everything the engine reacts to
//! - [`RichTextNode`]: structured output of the text formatter
//! - [`PresentationSurface`]: what a UI must implement
//! - [`Transport`]: what a duplex channel must implement
//!
//! # Module Overview
//!
//! - [`format`]: markdown-subset formatter producing rich text nodes
//! - [`render`]: escaping renderers (HTML, plain text) and link validation
//! - [`transport`]: duplex channel adapters with a strict lifecycle
//! - [`conversation`]: the state machine
//! - [`typing`]: the single "assistant is responding" marker
//! - [`surface`]: presentation surface seam and a headless implementation
//! - [`transcript`]: ordered chat message store for surfaces
//! - [`events`]: the inbound event queue
//! - [`session`]: wiring and the event-driving loop
//! - [`config`]: TOML + environment configuration
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod conversation;
pub mod events;
pub mod format;
pub mod render;
pub mod session;
pub mod surface;
pub mod transcript;
pub mod transport;
pub mod typing;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, load_with_env, ClientConfig,
    ClientToml, ConfigError, ConfigOverrides, ConfigSource,
};
pub use conversation::{
    ConversationEngine, ConversationMode, Disposition, EngineConfig, RejectReason, SessionId,
    TerminalReason,
};
pub use events::{event_queue, ConversationEvent, EventReceiver, EventSender, QueueError};
pub use format::{format, HeaderLevel, RichTextNode};
pub use render::{render_html, render_plain, safe_link_target};
pub use session::{drive, in_process_session, Session};
pub use surface::{HeadlessSurface, PresentationSurface, SurfaceCall};
pub use transcript::{ChatMessage, MessageContent, MessageRole, Transcript};
pub use transport::{
    ChannelState, InProcessTransport, RemoteEnd, Transport, TransportConfig, TransportError,
    TransportEvent, DEFAULT_URL,
};
pub use typing::{TypingHandle, TypingIndicator};

#[cfg(feature = "websocket")]
pub use session::connect_session;
#[cfg(feature = "websocket")]
pub use transport::WebSocketTransport;
