//! Shared lifecycle bookkeeping for transport implementations
//!
//! Guarantees the event discipline every transport must follow: `Opened`
//! only from `Connecting`, messages only while `Open`, one terminal event,
//! then silence.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::traits::{ChannelState, TransportError, TransportEvent};
use crate::events::{EventSender, QueueError};

/// Frames queued for the I/O side
#[derive(Debug)]
pub(crate) enum Outbound {
    Text(String),
    Close,
}

/// State cell plus the event queue it reports into
#[derive(Clone, Debug)]
pub(crate) struct Lifecycle {
    state: Arc<AtomicU8>,
    events: EventSender,
}

impl Lifecycle {
    pub(crate) fn new(events: EventSender) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ChannelState::Connecting as u8)),
            events,
        }
    }

    pub(crate) fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn advance(&self, from: ChannelState, to: ChannelState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Move to a terminal state from whatever non-terminal state we are in
    fn terminate(&self, to: ChannelState) -> bool {
        let mut current = self.state();
        while !current.is_terminal() {
            if self.advance(current, to) {
                return true;
            }
            current = self.state();
        }
        false
    }

    async fn emit(&self, event: TransportEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("event queue closed, transport event dropped");
        }
    }

    pub(crate) async fn opened(&self) {
        if self.advance(ChannelState::Connecting, ChannelState::Open) {
            tracing::info!("channel open");
            self.emit(TransportEvent::Opened).await;
        }
    }

    pub(crate) async fn message(&self, text: String) {
        if self.state() == ChannelState::Open {
            tracing::debug!(len = text.len(), "message received");
            self.emit(TransportEvent::MessageReceived(text)).await;
        } else {
            tracing::debug!(state = %self.state(), "message outside open channel dropped");
        }
    }

    pub(crate) async fn closed(&self) {
        if self.terminate(ChannelState::Closed) {
            tracing::info!("channel closed");
            self.emit(TransportEvent::Closed).await;
        }
    }

    pub(crate) async fn errored(&self, info: String) {
        if self.terminate(ChannelState::Errored) {
            tracing::warn!(error = %info, "channel errored");
            self.emit(TransportEvent::Errored(info)).await;
        }
    }

    /// Synchronous close for `Transport::close`
    pub(crate) fn closed_now(&self) -> bool {
        if !self.terminate(ChannelState::Closed) {
            return false;
        }
        tracing::info!("channel closed locally");
        match self.events.try_send(TransportEvent::Closed) {
            Ok(()) => {}
            Err(QueueError::Full) => self.closed_later(),
            Err(QueueError::Closed) => {
                tracing::debug!("event queue closed, close event dropped");
            }
        }
        true
    }

    /// Queue `Closed` from a task once the full queue has room; it is still
    /// the last transport event since nothing follows a terminal state
    fn closed_later(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("event queue full, close event deferred");
                let lifecycle = self.clone();
                handle.spawn(async move { lifecycle.emit(TransportEvent::Closed).await });
            }
            Err(_) => {
                tracing::warn!("event queue full outside a runtime, close event dropped");
            }
        }
    }

    /// Queue an outbound frame if the channel is open
    pub(crate) fn send(
        &self,
        outbound: &mpsc::UnboundedSender<Outbound>,
        text: &str,
    ) -> Result<(), TransportError> {
        let state = self.state();
        if state != ChannelState::Open {
            tracing::debug!(%state, len = text.len(), "send on non-open channel dropped");
            return Err(TransportError::NotOpen(state));
        }
        outbound
            .send(Outbound::Text(text.to_string()))
            .map_err(|_| TransportError::SendFailed("I/O task stopped".to_string()))
    }
}
