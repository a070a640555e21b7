//! WebSocket transport against a real server on an ephemeral port
#![cfg(feature = "websocket")]

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use databot_core::{
    connect_session, ChannelState, ClientConfig, ConversationEvent, Disposition, HeadlessSurface,
    MessageRole, Session, TerminalReason, Transport, TransportConfig, WebSocketTransport,
};

/// Accept one client, answer its first message in bold, then close
async fn one_shot_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                ws.send(Message::Text(format!("**{text}**"))).await.unwrap();
                ws.close(None).await.unwrap();
                break;
            }
        }
        // Drain until the client acknowledges the close
        while let Some(Ok(_)) = ws.next().await {}
    });

    format!("ws://{addr}/ws")
}

async fn step(session: &mut Session<HeadlessSurface, WebSocketTransport>) -> Disposition {
    let event = timeout(Duration::from_secs(5), session.receiver.recv())
        .await
        .expect("event within timeout")
        .expect("queue open");
    session.engine.handle_event(event)
}

#[tokio::test]
async fn test_round_trip_then_server_close() {
    let url = one_shot_server().await;
    let mut config = ClientConfig::default();
    config.transport = TransportConfig::with_url(url);

    let mut session = connect_session(&config, HeadlessSurface::new());
    assert_eq!(step(&mut session).await, Disposition::Opened);
    assert_eq!(session.engine.transport().state(), ChannelState::Open);

    session
        .engine
        .handle_event(ConversationEvent::submit("total sales"));
    assert_eq!(
        step(&mut session).await,
        Disposition::Delivered { solicited: true }
    );
    assert_eq!(
        step(&mut session).await,
        Disposition::Terminated(TerminalReason::Closed)
    );

    let roles: Vec<_> = session
        .engine
        .surface()
        .transcript()
        .messages()
        .iter()
        .map(|m| m.role())
        .collect();
    assert_eq!(
        roles,
        vec![MessageRole::User, MessageRole::Assistant, MessageRole::System]
    );
    assert_eq!(session.engine.transport().state(), ChannelState::Closed);

    // Inert after close
    assert!(session.engine.transport().send("again").is_err());
}

#[tokio::test]
async fn test_server_close_is_acknowledged() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (ack_tx, ack_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.close(None).await.unwrap();
        let mut acknowledged = false;
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Close(_) = msg {
                acknowledged = true;
            }
        }
        let _ = ack_tx.send(acknowledged);
    });

    let mut config = ClientConfig::default();
    config.transport = TransportConfig::with_url(format!("ws://{addr}/ws"));
    let mut session = connect_session(&config, HeadlessSurface::new());

    assert_eq!(step(&mut session).await, Disposition::Opened);
    assert_eq!(
        step(&mut session).await,
        Disposition::Terminated(TerminalReason::Closed)
    );

    let acknowledged = timeout(Duration::from_secs(5), ack_rx)
        .await
        .expect("server finished")
        .expect("server reported");
    assert!(acknowledged, "client never answered the close frame");
}
