//! Session wiring and the event-driving loop
//!
//! A session is an engine plus the two ends of its event queue. The
//! transport holds a clone of the sender; the surface's input loop holds
//! another.

use crate::config::ClientConfig;
use crate::conversation::{ConversationEngine, TerminalReason};
use crate::events::{event_queue, EventReceiver, EventSender};
use crate::surface::PresentationSurface;
use crate::transport::{InProcessTransport, RemoteEnd, Transport};

/// A wired conversation
pub struct Session<S: PresentationSurface, T: Transport> {
    /// The state machine
    pub engine: ConversationEngine<S, T>,
    /// Producer for user submissions
    pub sender: EventSender,
    /// The engine's inbound queue
    pub receiver: EventReceiver,
}

impl<S: PresentationSurface, T: Transport> Session<S, T> {
    /// Drive the engine until the session ends or every sender is gone
    pub async fn run(&mut self) -> Option<TerminalReason> {
        drive(&mut self.engine, &mut self.receiver).await
    }
}

/// Consume events one at a time until the engine is terminal or the queue
/// closes. Returns the terminal reason, if the session ended.
pub async fn drive<S, T>(
    engine: &mut ConversationEngine<S, T>,
    events: &mut EventReceiver,
) -> Option<TerminalReason>
where
    S: PresentationSurface,
    T: Transport,
{
    while !engine.is_terminal() {
        let Some(event) = events.recv().await else {
            tracing::debug!("event queue closed");
            break;
        };
        engine.handle_event(event);
    }
    engine.terminal_reason().cloned()
}

/// Wire a session over an in-process transport
///
/// The returned [`RemoteEnd`] plays the assistant.
pub fn in_process_session<S: PresentationSurface>(
    config: &ClientConfig,
    surface: S,
) -> (Session<S, InProcessTransport>, RemoteEnd) {
    let (sender, receiver) = event_queue(config.event_queue_capacity);
    let (transport, remote) = InProcessTransport::new_pair(sender.clone());
    let engine = ConversationEngine::new(config.engine.clone(), surface, transport);

    (
        Session {
            engine,
            sender,
            receiver,
        },
        remote,
    )
}

/// Wire a session over a WebSocket connection to `config.transport.url`
///
/// Connecting starts immediately in the background; must be called inside
/// a tokio runtime.
#[cfg(feature = "websocket")]
pub fn connect_session<S: PresentationSurface>(
    config: &ClientConfig,
    surface: S,
) -> Session<S, crate::transport::WebSocketTransport> {
    let (sender, receiver) = event_queue(config.event_queue_capacity);
    let transport = crate::transport::WebSocketTransport::connect(&config.transport, sender.clone());
    let engine = ConversationEngine::new(config.engine.clone(), surface, transport);

    tracing::info!(
        session_id = %engine.session_id(),
        url = %config.transport.url,
        "session created"
    );

    Session {
        engine,
        sender,
        receiver,
    }
}
