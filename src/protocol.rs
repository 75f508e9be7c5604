//! Wire types for the Taleweave realtime room protocol.
//!
//! Every frame is a JSON text message. Client requests are wrapped in a
//! [`ClientFrame`] carrying an optional correlation id; the server answers
//! either with an [`Acknowledgement`] for that id or pushes a
//! [`ServerEvent`] on its own initiative.
//!
//! ```text
//! client → {"id":7,"message":{"type":"join_room","data":{"roomId":"r1",...}}}
//! server → {"kind":"ack","id":7,"success":true,"data":{...}}
//! server → {"kind":"event","event":{"type":"player_joined","data":{...}}}
//! ```
//!
//! Request and event payload fields are `camelCase`; message type tags are
//! `snake_case`.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::error_codes::ErrorCode;

// ── Type aliases ────────────────────────────────────────────────────

/// Identifier of a room on the game server.
pub type RoomId = String;

/// Identifier of a player, chosen by the host application.
pub type PlayerId = String;

/// Correlation id pairing a request with its acknowledgement.
pub type RequestId = u64;

// ── Enums ───────────────────────────────────────────────────────────

/// Why the local player is leaving a room.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeaveReason {
    /// The player chose to leave.
    #[default]
    Manual,
    /// The host removed the player.
    Kicked,
    /// The client gave up waiting on the session.
    Timeout,
    /// Any other application-defined reason.
    Custom(String),
}

impl LeaveReason {
    /// Wire representation of the reason.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => "manual",
            Self::Kicked => "kicked",
            Self::Timeout => "timeout",
            Self::Custom(reason) => reason,
        }
    }
}

impl From<&str> for LeaveReason {
    fn from(value: &str) -> Self {
        match value {
            "manual" => Self::Manual,
            "kicked" => Self::Kicked,
            "timeout" => Self::Timeout,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl Serialize for LeaveReason {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LeaveReason {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Scope of a state resynchronisation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    /// Complete room and game snapshot.
    #[default]
    Full,
    /// Only state that changed recently.
    Partial,
}

// ── Request payloads ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub player_name: String,
    /// Resume a previous membership with the same identity.
    #[serde(default)]
    pub rejoin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub reason: LeaveReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadyStatusRequest {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub is_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub sync_type: SyncType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BattleTurnRequest {
    pub player_id: Option<PlayerId>,
    pub action_type: String,
    pub target_id: Option<String>,
    pub ability_id: Option<String>,
    /// Milliseconds since the Unix epoch, taken when the action was sent.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioChoiceRequest {
    pub player_id: Option<PlayerId>,
    pub scenario_id: String,
    pub choice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareClueRequest {
    pub player_id: Option<PlayerId>,
    pub target_player_id: PlayerId,
    pub clue_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub timestamp: u64,
}

// ── Client → server ─────────────────────────────────────────────────

/// Requests sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinRoom(JoinRoomRequest),
    LeaveRoom(LeaveRoomRequest),
    ReadyStatus(ReadyStatusRequest),
    ChatMessage(ChatMessageRequest),
    RequestSync(SyncRequest),
    BattleTurn(BattleTurnRequest),
    ScenarioChoice(ScenarioChoiceRequest),
    ShareClue(ShareClueRequest),
    /// Liveness signal, sent without a correlation id.
    Heartbeat(HeartbeatRequest),
}

impl ClientMessage {
    /// The wire `type` tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "join_room",
            Self::LeaveRoom(_) => "leave_room",
            Self::ReadyStatus(_) => "ready_status",
            Self::ChatMessage(_) => "chat_message",
            Self::RequestSync(_) => "request_sync",
            Self::BattleTurn(_) => "battle_turn",
            Self::ScenarioChoice(_) => "scenario_choice",
            Self::ShareClue(_) => "share_clue",
            Self::Heartbeat(_) => "heartbeat",
        }
    }
}

/// Envelope for a client request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientFrame {
    /// Correlation id; the server echoes it in the acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub message: ClientMessage,
}

// ── Server → client ─────────────────────────────────────────────────

/// The single reply a server sends for a client request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Acknowledgement {
    pub id: RequestId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl Acknowledgement {
    /// A successful acknowledgement carrying `data`.
    pub fn ok(id: RequestId, data: Option<serde_json::Value>) -> Self {
        Self {
            id,
            success: true,
            data,
            error: None,
            code: None,
        }
    }

    /// A rejection carrying the server's error text.
    pub fn rejected(id: RequestId, error: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            data: None,
            error: Some(error.into()),
            code: None,
        }
    }

    /// Interpret the acknowledgement's success flag.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ServerRejected`] when `success` is `false`.
    pub fn into_result(self) -> Result<serde_json::Value> {
        if self.success {
            Ok(self.data.unwrap_or(serde_json::Value::Null))
        } else {
            Err(ClientError::ServerRejected {
                message: self
                    .error
                    .unwrap_or_else(|| "request rejected by server".to_string()),
                code: self.code,
            })
        }
    }
}

// Push payloads fill any missing field with its default, so a push whose
// `type` is known is always relayed even when the server omits fields.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerJoinedPayload {
    pub player_id: PlayerId,
    pub player_name: String,
    pub is_host: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerLeftPayload {
    pub player_id: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<LeaveReason>,
}

/// Payload shared by `player_disconnected` and `player_reconnected`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerPresencePayload {
    pub player_id: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HostChangedPayload {
    pub new_host_id: PlayerId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseChangedPayload {
    pub phase: String,
    /// Phase-specific state, forwarded untouched to UI consumers.
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerReadyChangedPayload {
    pub player_id: PlayerId,
    pub is_ready: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub player_id: PlayerId,
    pub player_name: String,
    pub message: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleActionPayload {
    pub player_id: PlayerId,
    pub action_type: String,
    pub target_id: Option<String>,
    pub ability_id: Option<String>,
    /// Server-resolved outcome (damage, status effects, ...).
    pub result: serde_json::Value,
}

/// Announces that a player has chosen, without revealing what they chose.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioChoiceMadePayload {
    pub player_id: PlayerId,
    pub scenario_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClueReceivedPayload {
    pub from_player_id: PlayerId,
    pub clue_id: String,
    pub clue: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Events the server pushes without a matching client request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
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
    Error(ErrorPayload),
}

/// Any frame the server may send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Reply to a client request.
    Ack(Acknowledgement),
    /// Server-initiated push.
    Event { event: ServerEvent },
}

/// Milliseconds since the Unix epoch; `0` if the clock is before the epoch.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
