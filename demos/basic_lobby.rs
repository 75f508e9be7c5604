//! # Basic Lobby Example
//!
//! A complete session lifecycle against a real server:
//!
//! 1. Connect over WebSocket
//! 2. Join a room and mark ready
//! 3. React to room events (players joining, phase changes, chat)
//! 4. Rejoin automatically after a reconnect
//! 5. Disconnect gracefully on Ctrl+C
//!
//! ## Running
//!
//! ```sh
//! # Start a Taleweave room server on localhost:3001, then:
//! cargo run --example basic_lobby
//!
//! # Override the server URL:
//! TALEWEAVE_URL=ws://my-server:3001/ws cargo run --example basic_lobby
//! ```

use taleweave_multiplayer::{
    handler, ClientConfig, ClientEvent, EventName, JoinRoomParams, LeaveReason, MultiplayerClient,
};
use tokio::sync::mpsc;

/// Default server URL when `TALEWEAVE_URL` is not set.
const DEFAULT_URL: &str = "ws://localhost:3001/ws";

const ROOM_ID: &str = "example-room";
const PLAYER_ID: &str = "rust-player";
const PLAYER_NAME: &str = "RustPlayer";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let url = std::env::var("TALEWEAVE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    tracing::info!("Connecting to {url}");

    let mut client = MultiplayerClient::websocket(url, ClientConfig::default());

    // ── Event forwarding ────────────────────────────────────────────
    // Handlers run on the session task; hand events to the main loop so it
    // can await client operations in response.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    for name in EventName::ALL {
        let tx = event_tx.clone();
        client.on(
            name,
            handler(move |event| {
                let _ = tx.send(event.clone());
            }),
        );
    }

    // ── Connect and join ────────────────────────────────────────────
    client.connect().await?;
    let room = client
        .join_room(JoinRoomParams::new(ROOM_ID, PLAYER_ID, PLAYER_NAME))
        .await?;
    tracing::info!("Joined room {ROOM_ID}: {room}");
    client.set_ready(true).await?;

    // ── Event loop ──────────────────────────────────────────────────
    let mut connected_once = false;
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };

                match event {
                    ClientEvent::Connected { connection_id } => {
                        tracing::info!("Connected ({connection_id})");
                        // The first connection was already handled above.
                        if connected_once && client.status().current_room.is_some() {
                            let params = JoinRoomParams::new(ROOM_ID, PLAYER_ID, PLAYER_NAME)
                                .with_rejoin(true);
                            match client.join_room(params).await {
                                Ok(_) => tracing::info!("Rejoined {ROOM_ID}"),
                                Err(e) => tracing::error!("Rejoin failed: {e}"),
                            }
                        }
                        connected_once = true;
                    }

                    ClientEvent::Disconnected { reason } => {
                        let reason = reason.as_deref().unwrap_or("closed by server");
                        tracing::warn!("Disconnected: {reason}");
                    }

                    ClientEvent::Reconnecting { attempt } => {
                        tracing::info!("Reconnecting (attempt {attempt})…");
                    }

                    ClientEvent::ReconnectFailed { attempts } => {
                        tracing::error!("Gave up after {attempts} attempt(s)");
                        break;
                    }

                    ClientEvent::PlayerJoined(player) => {
                        tracing::info!(
                            "Player joined: {} ({})",
                            player.player_name,
                            player.player_id
                        );
                    }

                    ClientEvent::PlayerLeft(left) => {
                        tracing::info!("Player left: {}", left.player_id);
                    }

                    ClientEvent::PhaseChanged(phase) => {
                        tracing::info!("Phase → {}", phase.phase);
                    }

                    ClientEvent::ChatMessage(chat) => {
                        tracing::info!("[chat] {}: {}", chat.player_name, chat.message);
                    }

                    ClientEvent::Error(error) => {
                        tracing::error!("Server error [{:?}]: {}", error.code, error.message);
                    }

                    other => {
                        tracing::debug!("Event: {other:?}");
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down…");
                break;
            }
        }
    }

    // ── Cleanup ─────────────────────────────────────────────────────
    if let Err(e) = client.leave_room(LeaveReason::Manual).await {
        tracing::warn!("Leave failed: {e}");
    }
    client.disconnect().await;
    tracing::info!("Client shut down. Goodbye!");
    Ok(())
}
