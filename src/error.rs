//! Error types for the multiplayer session client.

use thiserror::Error;

use crate::error_codes::ErrorCode;

/// Errors that can occur when using the multiplayer client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// Attempted an operation that requires an active connection, but the client is not connected.
    #[error("not connected to server")]
    NotConnected,

    /// Attempted an in-room operation but the client is not in a room.
    #[error("not in a room")]
    NotInRoom,

    /// The server acknowledged a request with `success = false`.
    #[error("{message}")]
    ServerRejected {
        /// Error text supplied by the server.
        message: String,
        /// Structured error code, if the server provided one.
        code: Option<ErrorCode>,
    },

    /// The connection dropped (or the client disconnected) while a request
    /// was still awaiting its acknowledgement.
    #[error("connection lost before the request was acknowledged")]
    TransportLost,

    /// Every automatic reconnection attempt failed.
    #[error("gave up after {attempts} reconnection attempt(s)")]
    ReconnectExhausted {
        /// Number of reconnection attempts made in this cycle.
        attempts: u32,
    },

    /// A connector could not establish a transport.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// Connection establishment timed out.
    #[error("operation timed out")]
    Timeout,

    /// An event name string did not match any known event.
    #[error("unknown event name: {0}")]
    UnknownEvent(String),
}

impl ClientError {
    /// Returns the server's error text for [`ServerRejected`](Self::ServerRejected).
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerRejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A specialized [`Result`] type for multiplayer client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
