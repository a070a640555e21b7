//! Dev Server Implementation
//!
//! - Accepts TCP connections and upgrades them to WebSocket at one path
//! - Refuses the handshake with 404 for any other path
//! - Spawns a handler task per connection
//! - Answers each text frame with exactly one text frame

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn, Instrument};

use crate::responder::Responder;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default WebSocket path
pub const DEFAULT_PATH: &str = "/ws";

/// A bound dev server
pub struct DevServer {
    listener: TcpListener,
    path: Arc<str>,
    responder: Arc<dyn Responder>,
}

impl DevServer {
    /// Bind to `addr`, serving WebSocket upgrades at `path`
    pub async fn bind(addr: &str, path: &str, responder: Box<dyn Responder>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {addr}"))?;
        Ok(Self {
            listener,
            path: Arc::from(path),
            responder: Arc::from(responder),
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Accept connections until the task is dropped
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, path = %self.path, "Listening for connections");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    continue;
                }
            };

            let path = Arc::clone(&self.path);
            let responder = Arc::clone(&self.responder);
            tokio::spawn(
                async move {
                    if let Err(e) = handle_connection(stream, &path, responder.as_ref()).await {
                        warn!(error = %e, "Connection ended with error");
                    }
                }
                .instrument(tracing::info_span!("connection", %peer)),
            );
        }
    }
}

/// Serve one client: handshake, then one reply per text frame
async fn handle_connection(stream: TcpStream, path: &str, responder: &dyn Responder) -> Result<()> {
    let expected = path.to_string();
    let check_path = move |request: &Request, response: Response| {
        let requested = request.uri().path();
        if requested == expected {
            Ok(response)
        } else {
            warn!(path = %requested, "Refusing handshake for unknown path");
            let mut refusal = ErrorResponse::new(Some(format!("no endpoint at {requested}")));
            *refusal.status_mut() = StatusCode::NOT_FOUND;
            Err(refusal)
        }
    };

    let ws = tokio_tungstenite::accept_hdr_async(stream, check_path)
        .await
        .context("WebSocket handshake failed")?;
    info!("Client connected");

    let (mut write, mut read) = ws.split();
    while let Some(frame) = read.next().await {
        match frame.context("Read error")? {
            Message::Text(text) => {
                debug!(len = text.len(), "Received message");
                let reply = responder.respond(&text).unwrap_or_default();
                write
                    .send(Message::Text(reply))
                    .await
                    .context("Failed to send reply")?;
            }
            Message::Binary(data) => debug!(len = data.len(), "Ignoring binary frame"),
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("Client disconnected");
    Ok(())
}
