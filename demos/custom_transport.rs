//! # Custom Transport Example
//!
//! Implements [`Transport`] and [`Connector`] over an in-process loopback
//! channel and plays the server side by hand. Useful for:
//!
//! - **Testing**: exercise game UI logic without a real server
//! - **Custom backends**: adapt any I/O layer (TCP, QUIC, WebRTC data channels)
//!
//! ## Running
//!
//! ```sh
//! cargo run --example custom_transport
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use taleweave_multiplayer::protocol::{
    Acknowledgement, ChatMessagePayload, ClientFrame, ClientMessage, ServerEvent, ServerFrame,
};
use taleweave_multiplayer::{
    handler, ClientConfig, ClientError, ClientEvent, Connector, EventName, JoinRoomParams,
    MultiplayerClient, Transport,
};
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────
// Step 1: A channel-based "loopback" transport
// ─────────────────────────────────────────────────────────────────────

pub struct LoopbackTransport {
    /// Frames the client sends (the server reads the other end).
    tx: mpsc::UnboundedSender<String>,
    /// Frames the server sends.
    rx: mpsc::UnboundedReceiver<String>,
}

/// The "server side" of the loopback.
pub struct LoopbackServer {
    pub rx: mpsc::UnboundedReceiver<String>,
    pub tx: mpsc::UnboundedSender<String>,
}

fn loopback_pair() -> (LoopbackTransport, LoopbackServer) {
    let (client_tx, server_rx) = mpsc::unbounded_channel();
    let (server_tx, client_rx) = mpsc::unbounded_channel();
    (
        LoopbackTransport {
            tx: client_tx,
            rx: client_rx,
        },
        LoopbackServer {
            rx: server_rx,
            tx: server_tx,
        },
    )
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, message: String) -> Result<(), ClientError> {
        self.tx
            .send(message)
            .map_err(|e| ClientError::TransportSend(e.to_string()))
    }

    /// Cancel-safe because `mpsc::UnboundedReceiver::recv` is.
    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: A connector that hands out the prepared transport once
// ─────────────────────────────────────────────────────────────────────

struct OneShotConnector(Mutex<Option<LoopbackTransport>>);

#[async_trait]
impl Connector for OneShotConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, ClientError> {
        let transport = self
            .0
            .lock()
            .map_err(|_| ClientError::ConnectFailed("connector poisoned".into()))?
            .take()
            .ok_or_else(|| ClientError::ConnectFailed("loopback already used".into()))?;
        Ok(Box::new(transport))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: Wire together the client and the fake server
// ─────────────────────────────────────────────────────────────────────

/// Acknowledge every request and echo chat lines back as room events.
async fn fake_server(mut server: LoopbackServer) {
    while let Some(text) = server.rx.recv().await {
        let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) else {
            tracing::warn!("server got an unreadable frame: {text}");
            continue;
        };
        tracing::info!("Server received: {}", frame.message.kind());

        let Some(id) = frame.id else {
            continue;
        };
        let data = match &frame.message {
            ClientMessage::JoinRoom(join) => {
                Some(json!({ "roomId": join.room_id, "players": [join.player_id] }))
            }
            _ => None,
        };
        let ack = ServerFrame::Ack(Acknowledgement::ok(id, data));
        let _ = server.tx.send(serde_json::to_string(&ack).unwrap_or_default());

        if let ClientMessage::ChatMessage(chat) = frame.message {
            let event = ServerFrame::Event {
                event: ServerEvent::ChatMessage(ChatMessagePayload {
                    player_id: chat.player_id,
                    player_name: "Alice".into(),
                    message: chat.message,
                    timestamp: 0,
                }),
            };
            let _ = server.tx.send(serde_json::to_string(&event).unwrap_or_default());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (transport, server) = loopback_pair();
    tokio::spawn(fake_server(server));

    let connector = OneShotConnector(Mutex::new(Some(transport)));
    let mut client = MultiplayerClient::new(connector, ClientConfig::default());

    let (chat_tx, mut chat_rx) = mpsc::unbounded_channel();
    client.on(
        EventName::ChatMessage,
        handler(move |event| {
            if let ClientEvent::ChatMessage(chat) = event {
                let _ = chat_tx.send(format!("{}: {}", chat.player_name, chat.message));
            }
        }),
    );

    client.connect().await?;
    let room = client
        .join_room(JoinRoomParams::new("room1", "p1", "Alice"))
        .await?;
    tracing::info!("Joined: {room}");

    client.send_chat_message("hello from the loopback").await?;
    if let Some(line) = chat_rx.recv().await {
        tracing::info!("Chat: {line}");
    }

    client.disconnect().await;
    tracing::info!("Done. Custom transport works!");
    Ok(())
}
