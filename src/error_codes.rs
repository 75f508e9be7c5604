//! Structured error codes that may accompany a rejected acknowledgement or a
//! pushed `error` event.
//!
//! The server sends these as `"SCREAMING_SNAKE_CASE"` strings (for example
//! `"ROOM_FULL"`). Codes this client does not know deserialize to
//! [`ErrorCode::Unknown`] instead of failing the whole frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error codes returned by the game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Room errors
    RoomNotFound,
    RoomFull,
    AlreadyInRoom,
    NotInRoom,
    GameInProgress,

    // Identity errors
    InvalidPlayerId,
    InvalidPlayerName,
    PlayerAlreadyConnected,

    // Game-flow errors
    NotHost,
    InvalidPhase,
    NotYourTurn,
    InvalidAction,
    InvalidChoice,
    ClueNotOwned,

    // Rate limiting
    RateLimitExceeded,
    MessageTooLarge,

    // Server errors
    InternalError,
    ServiceUnavailable,

    /// A code this client version does not recognise.
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Returns a human-readable description of this error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RoomNotFound => "The room does not exist or has already been closed.",
            Self::RoomFull => "The room has reached its player limit.",
            Self::AlreadyInRoom => "This player is already a member of a room.",
            Self::NotInRoom => "The server does not consider this player part of the room.",
            Self::GameInProgress => "The session has started and no longer accepts new players.",
            Self::InvalidPlayerId => "The player identifier was empty or malformed.",
            Self::InvalidPlayerName => "The player name is empty or violates naming rules.",
            Self::PlayerAlreadyConnected => {
                "Another connection is already active for this player identity."
            }
            Self::NotHost => "Only the room host may perform this action.",
            Self::InvalidPhase => "The action is not allowed in the current game phase.",
            Self::NotYourTurn => "It is not this player's turn in the battle.",
            Self::InvalidAction => "The battle action, target, or ability is not valid.",
            Self::InvalidChoice => "The scenario choice is not available.",
            Self::ClueNotOwned => "The clue cannot be shared because this player does not hold it.",
            Self::RateLimitExceeded => "Too many requests were sent. Slow down and try again.",
            Self::MessageTooLarge => "The message exceeds the maximum allowed size.",
            Self::InternalError => "The server hit an unexpected error.",
            Self::ServiceUnavailable => "The server is temporarily unavailable.",
            Self::Unknown => "The server returned an error code this client does not recognise.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
