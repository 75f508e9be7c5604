//! # Taleweave Multiplayer
//!
//! Async client for the Taleweave realtime room protocol.
//!
//! This crate keeps one live connection to a game server, tracks which room
//! the local player is in, turns acknowledged requests into `async` calls, and
//! relays server pushes to registered handlers.
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement [`Connector`] and [`Transport`] for any backend
//! - **Automatic reconnection** with bounded exponential backoff ([`ReconnectPolicy`])
//! - **Acknowledged requests**: every room operation resolves with the server's answer
//! - **Heartbeats** while in a room
//! - **WebSocket built-in**: default `transport-websocket` feature provides [`WebSocketConnector`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taleweave_multiplayer::{
//!     handler, ClientConfig, ClientEvent, EventName, JoinRoomParams, MultiplayerClient,
//! };
//!
//! # async fn run() -> taleweave_multiplayer::Result<()> {
//! let url = "ws://localhost:3001/ws";
//! let mut client = MultiplayerClient::websocket(url, ClientConfig::default());
//!
//! client.on(
//!     EventName::PlayerJoined,
//!     handler(|event| {
//!         if let ClientEvent::PlayerJoined(player) = event {
//!             println!("{} joined", player.player_name);
//!         }
//!     }),
//! );
//!
//! client.connect().await?;
//! client.join_room(JoinRoomParams::new("room1", "p1", "Alice")).await?;
//! client.send_chat_message("hello").await?;
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod error_codes;
pub mod event;
pub mod heartbeat;
pub mod pending;
pub mod protocol;
pub mod reconnect;
pub mod state;
mod sync;
pub mod transport;
#[cfg(feature = "transport-websocket")]
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{JoinRoomParams, MultiplayerClient};
pub use config::ClientConfig;
pub use dispatcher::{handler, EventDispatcher, Handler};
pub use error::{ClientError, Result};
pub use error_codes::ErrorCode;
pub use event::{ClientEvent, EventName};
pub use protocol::{LeaveReason, SyncType};
pub use reconnect::ReconnectPolicy;
pub use state::{ClientStatus, ConnectionId, ConnectionStatus};
pub use transport::{Connector, Transport};
#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
