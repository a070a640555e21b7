//! Conversation State Machine
//!
//! The engine owns the conversation mode and the reply-pending flag, and
//! reacts to one [`ConversationEvent`] at a time by driving the surface,
//! the typing indicator, the formatter and the transport.
//!
//! ```text
//!            first accepted submit
//!  Greeting ───────────────────────► Active
//!                                      │
//!      submit ──► pending ──► reply ───┘ (idle again)
//!
//!  close / error (any mode) ──► terminal, input disabled for good
//! ```
//!
//! Input is enabled exactly when the channel has opened, no reply is
//! pending and the session is not terminal.

use std::fmt;

use uuid::Uuid;

use crate::events::ConversationEvent;
use crate::format::format;
use crate::surface::PresentationSurface;
use crate::transcript::{MessageContent, MessageRole};
use crate::transport::{Transport, TransportEvent};
use crate::typing::TypingIndicator;

/// Identifier for one conversation, used for log correlation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which view the conversation is in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversationMode {
    /// Landing view, nothing sent yet
    Greeting,
    /// Transcript view; never reverts to Greeting
    Active,
}

/// Why the session ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalReason {
    /// The channel closed
    Closed,
    /// The channel failed
    Errored(String),
}

/// Why a submission was not sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Empty or whitespace-only
    Empty,
    /// A reply is still outstanding
    ReplyPending,
    /// The channel has not opened yet
    NotConnected,
    /// Longer than the configured limit
    TooLong,
    /// The session has ended
    Terminal,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty input"),
            Self::ReplyPending => write!(f, "reply pending"),
            Self::NotConnected => write!(f, "not connected"),
            Self::TooLong => write!(f, "input too long"),
            Self::Terminal => write!(f, "session ended"),
        }
    }
}

/// Outcome of handling one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Submission appended and sent
    Accepted,
    /// Submission dropped without any state change
    Rejected(RejectReason),
    /// The channel opened and input may be enabled
    Opened,
    /// Assistant message appended
    Delivered {
        /// Whether it answered an outstanding request
        solicited: bool,
    },
    /// The session ended
    Terminated(TerminalReason),
    /// Nothing to do (duplicate or post-terminal event)
    Ignored,
}

/// Engine settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longest accepted submission, in characters
    pub max_input_chars: usize,
    /// Notice appended when the channel closes
    pub closed_notice: String,
    /// Notice appended when the channel fails
    pub errored_notice: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 4000,
            closed_notice: "Connection closed. Restart to begin a new conversation.".to_string(),
            errored_notice: "Connection lost due to an error. Restart to try again.".to_string(),
        }
    }
}

/// The conversation state machine
pub struct ConversationEngine<S: PresentationSurface, T: Transport> {
    session_id: SessionId,
    config: EngineConfig,
    mode: ConversationMode,
    reply_pending: bool,
    channel_open: bool,
    terminal: Option<TerminalReason>,
    typing: TypingIndicator,
    /// Last value pushed to the surface
    input_enabled: bool,
    surface: S,
    transport: T,
    span: tracing::Span,
}

impl<S: PresentationSurface, T: Transport> ConversationEngine<S, T> {
    /// Create an engine in Greeting mode with input disabled
    pub fn new(config: EngineConfig, mut surface: S, transport: T) -> Self {
        let session_id = SessionId::new();
        let span = tracing::info_span!("conversation", session_id = %session_id);
        surface.set_input_enabled(false);

        Self {
            session_id,
            config,
            mode: ConversationMode::Greeting,
            reply_pending: false,
            channel_open: false,
            terminal: None,
            typing: TypingIndicator::new(),
            input_enabled: false,
            surface,
            transport,
            span,
        }
    }

    /// Handle one event
    pub fn handle_event(&mut self, event: ConversationEvent) -> Disposition {
        let span = self.span.clone();
        let _guard = span.enter();
        let kind = event.kind();

        let disposition = match event {
            ConversationEvent::UserSubmit(text) => self.on_submit(text),
            ConversationEvent::Transport(TransportEvent::Opened) => self.on_opened(),
            ConversationEvent::Transport(TransportEvent::MessageReceived(text)) => {
                self.on_message(&text)
            }
            ConversationEvent::Transport(TransportEvent::Closed) => {
                self.on_terminal(TerminalReason::Closed)
            }
            ConversationEvent::Transport(TransportEvent::Errored(info)) => {
                self.on_terminal(TerminalReason::Errored(info))
            }
        };

        self.sync_input();
        tracing::debug!(event = kind, ?disposition, "event handled");
        disposition
    }

    fn on_submit(&mut self, text: String) -> Disposition {
        let reject = if self.terminal.is_some() {
            Some(RejectReason::Terminal)
        } else if self.reply_pending {
            Some(RejectReason::ReplyPending)
        } else if text.trim().is_empty() {
            Some(RejectReason::Empty)
        } else if !self.channel_open {
            Some(RejectReason::NotConnected)
        } else if text.chars().count() > self.config.max_input_chars {
            Some(RejectReason::TooLong)
        } else {
            None
        };
        if let Some(reason) = reject {
            tracing::debug!(reason = %reason, "submission rejected");
            return Disposition::Rejected(reason);
        }

        if self.mode == ConversationMode::Greeting {
            self.mode = ConversationMode::Active;
            self.surface.reveal_active_surface();
            tracing::info!("conversation started");
        }

        self.surface
            .append_message(MessageRole::User, MessageContent::Literal(text.clone()));
        self.reply_pending = true;
        self.typing.show(&mut self.surface);

        if let Err(e) = self.transport.send(&text) {
            tracing::debug!(error = %e, "transport dropped submission");
        }
        Disposition::Accepted
    }

    fn on_opened(&mut self) -> Disposition {
        if self.terminal.is_some() || self.channel_open {
            return Disposition::Ignored;
        }
        self.channel_open = true;
        Disposition::Opened
    }

    fn on_message(&mut self, text: &str) -> Disposition {
        if self.terminal.is_some() {
            return Disposition::Ignored;
        }

        let solicited = self.reply_pending;
        if solicited {
            self.typing.hide(&mut self.surface);
            self.reply_pending = false;
        } else {
            tracing::debug!(len = text.len(), "unsolicited assistant message");
        }

        let nodes = format(text);
        self.surface
            .append_message(MessageRole::Assistant, MessageContent::Rich(nodes));
        Disposition::Delivered { solicited }
    }

    fn on_terminal(&mut self, reason: TerminalReason) -> Disposition {
        if self.terminal.is_some() {
            return Disposition::Ignored;
        }

        self.typing.hide(&mut self.surface);
        self.reply_pending = false;
        self.channel_open = false;

        let notice = match &reason {
            TerminalReason::Closed => {
                tracing::info!("session ended: channel closed");
                self.config.closed_notice.clone()
            }
            TerminalReason::Errored(info) => {
                tracing::warn!(error = %info, "session ended: channel errored");
                self.config.errored_notice.clone()
            }
        };
        self.surface
            .append_message(MessageRole::System, MessageContent::Literal(notice));

        self.terminal = Some(reason.clone());
        Disposition::Terminated(reason)
    }

    fn sync_input(&mut self) {
        let enabled = self.channel_open && !self.reply_pending && self.terminal.is_none();
        if enabled != self.input_enabled {
            self.input_enabled = enabled;
            self.surface.set_input_enabled(enabled);
        }
    }

    /// Close the transport; the resulting `Closed` event ends the session
    /// once it is handled
    pub fn shutdown(&self) {
        tracing::debug!("shutdown requested");
        self.transport.close();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Session identifier
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Current mode
    #[must_use]
    pub fn mode(&self) -> ConversationMode {
        self.mode
    }

    /// Whether a reply is outstanding
    #[must_use]
    pub fn is_reply_pending(&self) -> bool {
        self.reply_pending
    }

    /// Whether the session has ended
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Why the session ended, if it has
    #[must_use]
    pub fn terminal_reason(&self) -> Option<&TerminalReason> {
        self.terminal.as_ref()
    }

    /// Whether input is currently enabled
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Whether the typing marker is showing
    #[must_use]
    pub fn typing_visible(&self) -> bool {
        self.typing.is_visible()
    }

    /// Engine settings
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, mutably (for UI-only state such as scrolling)
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Take the surface and transport back
    pub fn into_parts(self) -> (S, T) {
        (self.surface, self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{event_queue, EventReceiver};
    use crate::format::RichTextNode;
    use crate::surface::{HeadlessSurface, SurfaceCall};
    use crate::transport::{InProcessTransport, RemoteEnd};
    use pretty_assertions::assert_eq;

    type Engine = ConversationEngine<HeadlessSurface, InProcessTransport>;

    async fn open_engine() -> (Engine, RemoteEnd, EventReceiver) {
        let (tx, mut rx) = event_queue(16);
        let (transport, remote) = InProcessTransport::new_pair(tx);
        let mut engine = ConversationEngine::new(EngineConfig::default(), HeadlessSurface::new(), transport);
        remote.open().await;
        let opened = rx.recv().await.unwrap();
        assert_eq!(engine.handle_event(opened), Disposition::Opened);
        engine.surface_mut().take_calls();
        (engine, remote, rx)
    }

    fn assert_typing_matches_pending(engine: &Engine) {
        assert_eq!(engine.typing_visible(), engine.is_reply_pending());
        assert_eq!(engine.surface().typing_visible(), engine.is_reply_pending());
    }

    #[test]
    fn test_initial_state() {
        let (tx, _rx) = event_queue(4);
        let (transport, _remote) = InProcessTransport::new_pair(tx);
        let engine = ConversationEngine::new(EngineConfig::default(), HeadlessSurface::new(), transport);

        assert_eq!(engine.mode(), ConversationMode::Greeting);
        assert!(!engine.is_reply_pending());
        assert!(!engine.input_enabled());
        assert_eq!(engine.surface().calls(), &[SurfaceCall::SetInputEnabled(false)]);
    }

    #[tokio::test]
    async fn test_opened_enables_input() {
        let (tx, mut rx) = event_queue(4);
        let (transport, remote) = InProcessTransport::new_pair(tx);
        let mut engine = ConversationEngine::new(EngineConfig::default(), HeadlessSurface::new(), transport);

        remote.open().await;
        engine.handle_event(rx.recv().await.unwrap());

        assert!(engine.input_enabled());
        assert!(engine.surface().input_enabled());
        assert_eq!(
            engine.handle_event(TransportEvent::Opened.into()),
            Disposition::Ignored
        );
    }

    #[tokio::test]
    async fn test_submit_before_open_is_rejected() {
        let (tx, _rx) = event_queue(4);
        let (transport, mut remote) = InProcessTransport::new_pair(tx);
        let mut engine = ConversationEngine::new(EngineConfig::default(), HeadlessSurface::new(), transport);

        assert_eq!(
            engine.handle_event(ConversationEvent::submit("hi")),
            Disposition::Rejected(RejectReason::NotConnected)
        );
        assert_eq!(engine.mode(), ConversationMode::Greeting);
        assert!(engine.surface().transcript().is_empty());
        assert!(remote.drain_sent().is_empty());
    }

    #[tokio::test]
    async fn test_accepted_submit() {
        let (mut engine, mut remote, _rx) = open_engine().await;

        assert_eq!(engine.handle_event(ConversationEvent::submit("hi")), Disposition::Accepted);

        assert_eq!(remote.drain_sent(), vec!["hi".to_string()]);
        assert!(engine.is_reply_pending());
        assert_eq!(engine.mode(), ConversationMode::Active);
        assert_eq!(
            engine.surface().calls(),
            &[
                SurfaceCall::RevealActive,
                SurfaceCall::Append(MessageRole::User, MessageContent::Literal("hi".into())),
                SurfaceCall::ShowTyping,
                SurfaceCall::SetInputEnabled(false),
            ]
        );
        assert_typing_matches_pending(&engine);
    }

    #[tokio::test]
    async fn test_submit_while_pending_is_rejected() {
        let (mut engine, mut remote, _rx) = open_engine().await;
        engine.handle_event(ConversationEvent::submit("one"));
        engine.surface_mut().take_calls();

        assert_eq!(
            engine.handle_event(ConversationEvent::submit("two")),
            Disposition::Rejected(RejectReason::ReplyPending)
        );
        assert_eq!(remote.drain_sent(), vec!["one".to_string()]);
        assert!(engine.surface().calls().is_empty());
        assert_eq!(engine.surface().transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_submit_is_noop() {
        let (mut engine, mut remote, _rx) = open_engine().await;

        assert_eq!(
            engine.handle_event(ConversationEvent::submit("  \n\t ")),
            Disposition::Rejected(RejectReason::Empty)
        );
        assert_eq!(engine.mode(), ConversationMode::Greeting);
        assert!(remote.drain_sent().is_empty());
        assert!(engine.surface().calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_is_sent_untrimmed() {
        let (mut engine, mut remote, _rx) = open_engine().await;
        engine.handle_event(ConversationEvent::submit("  spaced  "));
        assert_eq!(remote.drain_sent(), vec!["  spaced  ".to_string()]);
    }

    #[tokio::test]
    async fn test_over_long_submit_is_rejected() {
        let (tx, mut rx) = event_queue(4);
        let (transport, mut remote) = InProcessTransport::new_pair(tx);
        let config = EngineConfig {
            max_input_chars: 3,
            ..EngineConfig::default()
        };
        let mut engine = ConversationEngine::new(config, HeadlessSurface::new(), transport);
        remote.open().await;
        engine.handle_event(rx.recv().await.unwrap());

        assert_eq!(
            engine.handle_event(ConversationEvent::submit("abcd")),
            Disposition::Rejected(RejectReason::TooLong)
        );
        // Counted in characters, not bytes
        assert_eq!(engine.handle_event(ConversationEvent::submit("äöü")), Disposition::Accepted);
        assert_eq!(remote.drain_sent(), vec!["äöü".to_string()]);
    }

    #[tokio::test]
    async fn test_greeting_to_active_happens_once() {
        let (mut engine, remote, mut rx) = open_engine().await;

        engine.handle_event(ConversationEvent::submit("a"));
        remote.reply("r").await;
        engine.handle_event(rx.recv().await.unwrap());
        engine.handle_event(ConversationEvent::submit("b"));

        let reveals = engine
            .surface()
            .calls()
            .iter()
            .filter(|c| **c == SurfaceCall::RevealActive)
            .count();
        assert_eq!(reveals, 1);
        assert_eq!(engine.mode(), ConversationMode::Active);
    }

    #[tokio::test]
    async fn test_reply_is_formatted_and_input_reenabled() {
        let (mut engine, remote, mut rx) = open_engine().await;
        engine.handle_event(ConversationEvent::submit("hi"));
        engine.surface_mut().take_calls();

        remote.reply("**hello**").await;
        let disposition = engine.handle_event(rx.recv().await.unwrap());

        assert_eq!(disposition, Disposition::Delivered { solicited: true });
        assert_eq!(
            engine.surface().calls(),
            &[
                SurfaceCall::HideTyping,
                SurfaceCall::Append(
                    MessageRole::Assistant,
                    MessageContent::Rich(vec![RichTextNode::Bold(vec![RichTextNode::text(
                        "hello"
                    )])])
                ),
                SurfaceCall::SetInputEnabled(true),
            ]
        );
        assert!(!engine.is_reply_pending());
        assert_typing_matches_pending(&engine);
    }

    #[tokio::test]
    async fn test_unsolicited_message_is_appended() {
        let (mut engine, remote, mut rx) = open_engine().await;

        remote.reply("welcome").await;
        assert_eq!(
            engine.handle_event(rx.recv().await.unwrap()),
            Disposition::Delivered { solicited: false }
        );
        assert_eq!(
            engine.surface().calls(),
            &[SurfaceCall::Append(
                MessageRole::Assistant,
                MessageContent::Rich(vec![RichTextNode::text("welcome")])
            )]
        );
        assert!(engine.input_enabled());
    }

    #[tokio::test]
    async fn test_close_while_pending() {
        let (mut engine, mut remote, mut rx) = open_engine().await;
        engine.handle_event(ConversationEvent::submit("hi"));
        remote.drain_sent();
        engine.surface_mut().take_calls();

        remote.close().await;
        let disposition = engine.handle_event(rx.recv().await.unwrap());

        assert_eq!(disposition, Disposition::Terminated(TerminalReason::Closed));
        let notice = EngineConfig::default().closed_notice;
        assert_eq!(
            engine.surface().calls(),
            &[
                SurfaceCall::HideTyping,
                SurfaceCall::Append(MessageRole::System, MessageContent::Literal(notice)),
            ]
        );
        assert!(!engine.is_reply_pending());
        assert!(!engine.input_enabled());

        assert_eq!(
            engine.handle_event(ConversationEvent::submit("retry")),
            Disposition::Rejected(RejectReason::Terminal)
        );
        assert!(remote.drain_sent().is_empty());
    }

    #[tokio::test]
    async fn test_error_uses_distinct_notice() {
        let (mut engine, remote, mut rx) = open_engine().await;

        remote.error("reset by peer").await;
        let disposition = engine.handle_event(rx.recv().await.unwrap());

        assert_eq!(
            disposition,
            Disposition::Terminated(TerminalReason::Errored("reset by peer".into()))
        );
        let last = engine.surface().transcript().last().cloned().unwrap();
        assert_eq!(last.role(), MessageRole::System);
        assert_eq!(
            last.content(),
            &MessageContent::Literal(EngineConfig::default().errored_notice)
        );
        assert_eq!(
            engine.surface().calls().last(),
            Some(&SurfaceCall::SetInputEnabled(false))
        );
    }

    #[tokio::test]
    async fn test_events_after_terminal_are_ignored() {
        let (mut engine, remote, mut rx) = open_engine().await;
        remote.close().await;
        engine.handle_event(rx.recv().await.unwrap());
        engine.surface_mut().take_calls();

        assert_eq!(
            engine.handle_event(TransportEvent::MessageReceived("late".into()).into()),
            Disposition::Ignored
        );
        assert_eq!(
            engine.handle_event(TransportEvent::Errored("late".into()).into()),
            Disposition::Ignored
        );
        assert_eq!(engine.handle_event(TransportEvent::Opened.into()), Disposition::Ignored);
        assert!(engine.surface().calls().is_empty());
    }

    #[tokio::test]
    async fn test_user_text_is_not_formatted() {
        let (mut engine, _remote, _rx) = open_engine().await;
        engine.handle_event(ConversationEvent::submit("**raw** <b>"));

        let first = &engine.surface().transcript().messages()[0];
        assert_eq!(first.content(), &MessageContent::Literal("**raw** <b>".into()));
    }

    #[tokio::test]
    async fn test_shutdown_leads_to_terminal() {
        let (mut engine, mut remote, mut rx) = open_engine().await;
        engine.shutdown();
        engine.handle_event(rx.recv().await.unwrap());

        assert!(engine.is_terminal());
        assert_eq!(engine.terminal_reason(), Some(&TerminalReason::Closed));
        assert!(remote.drain_sent().is_empty());
        assert!(remote.close_requested());
    }
}
