//! Transport abstraction for the realtime room protocol.
//!
//! The [`Transport`] trait is a bidirectional text message channel between
//! the client and the game server. Every frame is one JSON text message, so
//! implementations handle framing internally (WebSocket frames,
//! length-prefixed TCP, an in-process channel in tests, ...).
//!
//! # Connection Setup
//!
//! Because the session reconnects on its own, it cannot be handed a single
//! pre-built transport. Instead it is given a [`Connector`] that produces a
//! fresh, connected transport for every attempt. Connection parameters (URL,
//! TLS, headers) live in the connector.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use taleweave_multiplayer::error::ClientError;
//! use taleweave_multiplayer::transport::{Connector, Transport};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, _message: String) -> Result<(), ClientError> {
//!         // Send the JSON text frame
//!         Ok(())
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, ClientError>> {
//!         // Receive the next JSON text frame; None when closed cleanly
//!         None
//!     }
//!
//!     async fn close(&mut self) -> Result<(), ClientError> {
//!         Ok(())
//!     }
//! }
//!
//! struct MyConnector;
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     async fn connect(&self) -> Result<Box<dyn Transport>, ClientError> {
//!         Ok(Box::new(MyTransport {}))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ClientError;

/// A bidirectional text message transport.
///
/// Each call to [`send`](Transport::send) transmits one complete JSON frame.
/// Each call to [`recv`](Transport::recv) returns one complete JSON frame.
///
/// # Object Safety
///
/// This trait is object-safe; the session holds its transport as
/// `Box<dyn Transport>`.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is used
/// inside `tokio::select!`. If `recv` is cancelled before completion, calling it
/// again must not lose data. Channel-based implementations (e.g., wrapping
/// `mpsc::Receiver`) are naturally cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text frame to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportSend`] if the frame could not be sent.
    async fn send(&mut self, message: String) -> Result<(), ClientError>;

    /// Receive the next JSON text frame from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete frame was received
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the connection was closed cleanly by the server
    async fn recv(&mut self) -> Option<Result<String, ClientError>>;

    /// Close the transport connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the graceful shutdown fails. Implementations should
    /// still release resources even if the close handshake fails.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Factory for connected transports, called once per connection attempt.
///
/// The session wraps every call in the configured connect timeout, so
/// implementations do not need their own.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Establish a new connection.
    ///
    /// # Errors
    ///
    /// Any error fails this attempt; the session decides whether to retry.
    async fn connect(&self) -> Result<Box<dyn Transport>, ClientError>;
}
