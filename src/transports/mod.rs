//! Built-in transports for the Taleweave room protocol.
//!
//! | Feature                | Connector               | Transport              |
//! |------------------------|-------------------------|------------------------|
//! | `transport-websocket`  | [`WebSocketConnector`]  | [`WebSocketTransport`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use taleweave_multiplayer::{ClientConfig, MultiplayerClient, WebSocketConnector};
//!
//! let connector = WebSocketConnector::new("wss://play.example.com/ws");
//! let mut client = MultiplayerClient::new(connector, ClientConfig::default());
//! client.connect().await?;
//! ```

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::{WebSocketConnector, WebSocketTransport};
