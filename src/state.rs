//! The client's local view of its connection and room membership.

use serde::Serialize;
use uuid::Uuid;

use crate::protocol::{PlayerId, RoomId};

/// Identifier assigned to each established transport connection.
pub type ConnectionId = Uuid;

/// Connection lifecycle of a [`MultiplayerClient`](crate::MultiplayerClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Mutable session state shared by the client handle and the session task.
///
/// `current_room_id` is intended membership: a dropped connection keeps it so
/// the caller can rejoin, while an explicit leave or `disconnect()` clears it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub connection_status: ConnectionStatus,
    pub connection_id: Option<ConnectionId>,
    pub current_room_id: Option<RoomId>,
    pub local_player_id: Option<PlayerId>,
    pub local_player_name: Option<String>,
    pub reconnect_attempts: u32,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }

    pub fn in_room(&self) -> bool {
        self.current_room_id.is_some()
    }

    /// Room and player id, if the local player is in a room.
    pub fn membership(&self) -> Option<(RoomId, PlayerId)> {
        match (&self.current_room_id, &self.local_player_id) {
            (Some(room), Some(player)) => Some((room.clone(), player.clone())),
            _ => None,
        }
    }

    pub(crate) fn mark_connected(&mut self) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connection_status = ConnectionStatus::Connected;
        self.connection_id = Some(id);
        self.reconnect_attempts = 0;
        id
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.connection_status = ConnectionStatus::Disconnected;
        self.connection_id = None;
    }

    pub(crate) fn enter_room(&mut self, room_id: RoomId, player_id: PlayerId, player_name: String) {
        self.current_room_id = Some(room_id);
        self.local_player_id = Some(player_id);
        self.local_player_name = Some(player_name);
    }

    pub(crate) fn leave_room(&mut self) {
        self.current_room_id = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self) -> ClientStatus {
        ClientStatus {
            connected: self.is_connected(),
            current_room: self.current_room_id.clone(),
            player_id: self.local_player_id.clone(),
            player_name: self.local_player_name.clone(),
            connection_id: self.connection_id,
        }
    }
}

/// Snapshot returned by [`MultiplayerClient::status`](crate::MultiplayerClient::status).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatus {
    pub connected: bool,
    pub current_room: Option<RoomId>,
    pub player_id: Option<PlayerId>,
    pub player_name: Option<String>,
    pub connection_id: Option<ConnectionId>,
}
