//! Typed events published to UI consumers.
//!
//! Lifecycle events ([`Connected`](ClientEvent::Connected),
//! [`Disconnected`](ClientEvent::Disconnected),
//! [`Reconnecting`](ClientEvent::Reconnecting),
//! [`ReconnectFailed`](ClientEvent::ReconnectFailed)) are synthesized by the
//! session. Every other variant is a server push relayed verbatim.

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;
use crate::protocol::{
    BattleActionPayload, ChatMessagePayload, ClueReceivedPayload, ErrorPayload,
    HostChangedPayload, PhaseChangedPayload, PlayerJoinedPayload, PlayerLeftPayload,
    PlayerPresencePayload, PlayerReadyChangedPayload, ScenarioChoiceMadePayload, ServerEvent,
};
use crate::state::ConnectionId;

/// An event delivered through [`MultiplayerClient::on`](crate::MultiplayerClient::on).
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A transport connection was established.
    Connected { connection_id: ConnectionId },
    /// The connection dropped unexpectedly. Room membership is kept for a rejoin.
    Disconnected { reason: Option<String> },
    /// An automatic reconnection attempt is starting.
    Reconnecting { attempt: u32 },
    /// Every reconnection attempt failed; call `connect()` to try again.
    ReconnectFailed { attempts: u32 },
    PlayerJoined(PlayerJoinedPayload),
    PlayerLeft(PlayerLeftPayload),
    PlayerDisconnected(PlayerPresencePayload),
    PlayerReconnected(PlayerPresencePayload),
    HostChanged(HostChangedPayload),
    PhaseChanged(PhaseChangedPayload),
    PlayerReadyChanged(PlayerReadyChangedPayload),
    ChatMessage(ChatMessagePayload),
    BattleAction(BattleActionPayload),
    ScenarioChoiceMade(ScenarioChoiceMadePayload),
    ClueReceived(ClueReceivedPayload),
    /// Error pushed by the server outside of any acknowledgement.
    Error(ErrorPayload),
}

impl ClientEvent {
    /// The subscription key this event is published under.
    pub fn name(&self) -> EventName {
        match self {
            Self::Connected { .. } => EventName::Connected,
            Self::Disconnected { .. } => EventName::Disconnected,
            Self::Reconnecting { .. } => EventName::Reconnecting,
            Self::ReconnectFailed { .. } => EventName::ReconnectFailed,
            Self::PlayerJoined(_) => EventName::PlayerJoined,
            Self::PlayerLeft(_) => EventName::PlayerLeft,
            Self::PlayerDisconnected(_) => EventName::PlayerDisconnected,
            Self::PlayerReconnected(_) => EventName::PlayerReconnected,
            Self::HostChanged(_) => EventName::HostChanged,
            Self::PhaseChanged(_) => EventName::PhaseChanged,
            Self::PlayerReadyChanged(_) => EventName::PlayerReadyChanged,
            Self::ChatMessage(_) => EventName::ChatMessage,
            Self::BattleAction(_) => EventName::BattleAction,
            Self::ScenarioChoiceMade(_) => EventName::ScenarioChoiceMade,
            Self::ClueReceived(_) => EventName::ClueReceived,
            Self::Error(_) => EventName::Error,
        }
    }
}

impl From<ServerEvent> for ClientEvent {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::PlayerJoined(p) => Self::PlayerJoined(p),
            ServerEvent::PlayerLeft(p) => Self::PlayerLeft(p),
            ServerEvent::PlayerDisconnected(p) => Self::PlayerDisconnected(p),
            ServerEvent::PlayerReconnected(p) => Self::PlayerReconnected(p),
            ServerEvent::HostChanged(p) => Self::HostChanged(p),
            ServerEvent::PhaseChanged(p) => Self::PhaseChanged(p),
            ServerEvent::PlayerReadyChanged(p) => Self::PlayerReadyChanged(p),
            ServerEvent::ChatMessage(p) => Self::ChatMessage(p),
            ServerEvent::BattleAction(p) => Self::BattleAction(p),
            ServerEvent::ScenarioChoiceMade(p) => Self::ScenarioChoiceMade(p),
            ServerEvent::ClueReceived(p) => Self::ClueReceived(p),
            ServerEvent::Error(p) => Self::Error(p),
        }
    }
}

/// Subscription key for [`ClientEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    Connected,
    Disconnected,
    Reconnecting,
    ReconnectFailed,
    PlayerJoined,
    PlayerLeft,
    PlayerDisconnected,
    PlayerReconnected,
    HostChanged,
    PhaseChanged,
    PlayerReadyChanged,
    ChatMessage,
    BattleAction,
    ScenarioChoiceMade,
    ClueReceived,
    Error,
}

impl EventName {
    /// Every event name, in declaration order.
    pub const ALL: [EventName; 16] = [
        Self::Connected,
        Self::Disconnected,
        Self::Reconnecting,
        Self::ReconnectFailed,
        Self::PlayerJoined,
        Self::PlayerLeft,
        Self::PlayerDisconnected,
        Self::PlayerReconnected,
        Self::HostChanged,
        Self::PhaseChanged,
        Self::PlayerReadyChanged,
        Self::ChatMessage,
        Self::BattleAction,
        Self::ScenarioChoiceMade,
        Self::ClueReceived,
        Self::Error,
    ];

    /// The `snake_case` name UI code uses for this event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Reconnecting => "reconnecting",
            Self::ReconnectFailed => "reconnect_failed",
            Self::PlayerJoined => "player_joined",
            Self::PlayerLeft => "player_left",
            Self::PlayerDisconnected => "player_disconnected",
            Self::PlayerReconnected => "player_reconnected",
            Self::HostChanged => "host_changed",
            Self::PhaseChanged => "phase_changed",
            Self::PlayerReadyChanged => "player_ready_changed",
            Self::ChatMessage => "chat_message",
            Self::BattleAction => "battle_action",
            Self::ScenarioChoiceMade => "scenario_choice_made",
            Self::ClueReceived => "clue_received",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ClientError::UnknownEvent(s.to_string()))
    }
}
