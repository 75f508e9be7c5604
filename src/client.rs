//! Async multiplayer session client.
//!
//! [`MultiplayerClient`] is a handle over a background session task. The task
//! owns the single live [`Transport`], multiplexes outbound frames, inbound
//! frames and shutdown with `tokio::select!`, and reconnects through the
//! configured [`Connector`] when the connection drops.
//!
//! Room operations queue one request frame and await its acknowledgement.
//! Server pushes and lifecycle changes reach UI code through
//! [`MultiplayerClient::on`].
//!
//! # Example
//!
//! ```rust,ignore
//! let mut client = MultiplayerClient::new(connector, ClientConfig::default());
//! client.on(EventName::ChatMessage, handler(|event| println!("{event:?}")));
//!
//! client.connect().await?;
//! let room = client
//!     .join_room(JoinRoomParams::new("room1", "p1", "Alice"))
//!     .await?;
//! client.set_ready(true).await?;
//! ```

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::dispatcher::{EventDispatcher, Handler};
use crate::error::{ClientError, Result};
use crate::event::{ClientEvent, EventName};
use crate::heartbeat::LivenessMonitor;
use crate::pending::{PendingAck, PendingRequests};
use crate::protocol::{
    now_millis, BattleTurnRequest, ChatMessageRequest, ClientFrame, ClientMessage,
    HeartbeatRequest, JoinRoomRequest, LeaveReason, LeaveRoomRequest, PlayerId,
    ReadyStatusRequest, RoomId, ScenarioChoiceRequest, ServerEvent, ServerFrame,
    ShareClueRequest, SyncRequest, SyncType,
};
use crate::reconnect::Backoff;
use crate::state::{ClientStatus, ConnectionStatus, SessionState};
use crate::sync::lock;
use crate::transport::{Connector, Transport};

// ── JoinRoomParams ──────────────────────────────────────────────────

/// Parameters for joining a room.
///
/// # Example
///
/// ```
/// use taleweave_multiplayer::JoinRoomParams;
///
/// let params = JoinRoomParams::new("room1", "p1", "Alice").with_rejoin(true);
/// assert_eq!(params.room_id, "room1");
/// assert!(params.rejoin);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRoomParams {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub player_name: String,
    /// Resume a prior membership with the same identity, typically after a
    /// reconnect. Passed through to the server untouched.
    pub rejoin: bool,
}

impl JoinRoomParams {
    pub fn new(
        room_id: impl Into<RoomId>,
        player_id: impl Into<PlayerId>,
        player_name: impl Into<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            player_id: player_id.into(),
            player_name: player_name.into(),
            rejoin: false,
        }
    }

    #[must_use]
    pub fn with_rejoin(mut self, rejoin: bool) -> Self {
        self.rejoin = rejoin;
        self
    }
}

// ── Shared state ────────────────────────────────────────────────────

/// Work queued for the session task.
enum Command {
    Send(ClientFrame),
    Heartbeat,
}

/// State shared between the client handle and the session task.
///
/// Locks are held only for short synchronous sections, never across an
/// `.await` and never while handlers run.
struct Shared {
    state: Mutex<SessionState>,
    pending: Mutex<PendingRequests>,
    heartbeat: Mutex<LivenessMonitor>,
    dispatcher: EventDispatcher,
}

impl Shared {
    /// The ticker holds a weak sender and stops once the client handle is gone.
    fn start_heartbeat(&self, cmd_tx: &mpsc::WeakUnboundedSender<Command>) {
        let tx = cmd_tx.clone();
        lock(&self.heartbeat).start(move || {
            tx.upgrade()
                .is_some_and(|tx| tx.send(Command::Heartbeat).is_ok())
        });
    }

    fn stop_heartbeat(&self) {
        lock(&self.heartbeat).stop();
    }
}

/// The running session task and its control channels.
///
/// `cmd_tx` is the only strong sender, so dropping it closes the command
/// channel.
struct Session {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shutdown_tx: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

// ── Client handle ───────────────────────────────────────────────────

/// Handle for one multiplayer session.
///
/// Construct one per session and pass it to whatever UI layer needs it;
/// independent instances share nothing.
pub struct MultiplayerClient {
    connector: Arc<dyn Connector>,
    config: ClientConfig,
    shared: Arc<Shared>,
    session: Option<Session>,
}

impl MultiplayerClient {
    /// Create a disconnected client. Nothing happens until [`connect`](Self::connect).
    pub fn new(connector: impl Connector, config: ClientConfig) -> Self {
        let heartbeat = LivenessMonitor::new(config.heartbeat_interval);
        Self {
            connector: Arc::new(connector),
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::default()),
                pending: Mutex::new(PendingRequests::new()),
                heartbeat: Mutex::new(heartbeat),
                dispatcher: EventDispatcher::new(),
            }),
            session: None,
        }
    }

    /// Create a client that connects over WebSocket to `url`.
    #[cfg(feature = "transport-websocket")]
    pub fn websocket(url: impl Into<String>, config: ClientConfig) -> Self {
        Self::new(crate::transports::WebSocketConnector::new(url), config)
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Start the session and wait for the first connection.
    ///
    /// Returns immediately if a session is already connected. Initial
    /// failures are retried under the reconnect policy.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ReconnectExhausted`] once the attempt cap is
    /// reached (a `reconnect_failed` event is published as well). With
    /// reconnection disabled, the first attempt's error is returned.
    ///
    /// Returns [`ClientError::NotConnected`] without waiting if the session
    /// task is still running but has no live connection, i.e. it is between
    /// reconnection attempts. Wait for [`ClientEvent::Connected`] instead.
    pub async fn connect(&mut self) -> Result<()> {
        if self
            .session
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
        {
            if self.is_connected() {
                debug!("connect: session already connected");
                return Ok(());
            }
            debug!("connect: session is reconnecting");
            return Err(ClientError::NotConnected);
        }
        self.session = None;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        lock(&self.shared.state).connection_status = ConnectionStatus::Connecting;

        let session_loop = SessionLoop {
            connector: Arc::clone(&self.connector),
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            cmd_tx: cmd_tx.downgrade(),
            cmd_rx,
            shutdown_rx,
            ready_tx: Some(ready_tx),
        };
        let task = tokio::spawn(session_loop.run());

        self.session = Some(Session {
            cmd_tx,
            shutdown_tx,
            task,
        });

        ready_rx.await.unwrap_or(Err(ClientError::NotConnected))
    }

    /// Tear down the session: stop heartbeats, close the transport, fail
    /// in-flight requests with [`ClientError::TransportLost`] and reset state.
    ///
    /// No events are published once this is called. Calling it again is a no-op.
    pub async fn disconnect(&mut self) {
        self.shared.stop_heartbeat();

        if let Some(session) = self.session.take() {
            debug!("disconnect requested");
            let Session {
                cmd_tx,
                shutdown_tx,
                mut task,
            } = session;
            let _ = shutdown_tx.send(());
            drop(cmd_tx);

            // Await the session task with a timeout. If it doesn't exit in
            // time, abort it so it cannot keep the transport alive.
            match tokio::time::timeout(self.config.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("session task terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("session task did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("session task aborted: {join_err}");
                    }
                }
            }
        }

        let rejected = lock(&self.shared.pending).reject_all();
        if rejected > 0 {
            debug!(rejected, "rejected pending requests on disconnect");
        }
        lock(&self.shared.state).reset();
    }

    // ── Room operations ─────────────────────────────────────────────

    /// Join (or, with [`JoinRoomParams::with_rejoin`], resume) a room.
    ///
    /// On success the room and local identity are recorded, the heartbeat is
    /// started, and the server's room data is returned.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] without sending anything if not connected;
    /// [`ClientError::ServerRejected`] with the server's text on rejection, in
    /// which case local state is unchanged.
    pub async fn join_room(&self, params: JoinRoomParams) -> Result<Value> {
        let JoinRoomParams {
            room_id,
            player_id,
            player_name,
            rejoin,
        } = params;

        let data = self
            .request(ClientMessage::JoinRoom(JoinRoomRequest {
                room_id: room_id.clone(),
                player_id: player_id.clone(),
                player_name: player_name.clone(),
                rejoin,
            }))
            .await?;

        let connected = {
            let mut state = lock(&self.shared.state);
            state.enter_room(room_id.clone(), player_id, player_name);
            state.is_connected()
        };
        if let (true, Some(session)) = (connected, self.session.as_ref()) {
            self.shared.start_heartbeat(&session.cmd_tx.downgrade());
        }
        info!(room = %room_id, rejoin, "joined room");
        Ok(data)
    }

    /// Leave the current room. Resolves immediately if not in one.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] or [`ClientError::ServerRejected`]; in both
    /// cases membership is assumed to still hold and is kept.
    pub async fn leave_room(&self, reason: LeaveReason) -> Result<()> {
        let Some((room_id, player_id)) = lock(&self.shared.state).membership() else {
            debug!("leave_room: not in a room");
            return Ok(());
        };

        self.request(ClientMessage::LeaveRoom(LeaveRoomRequest {
            room_id: room_id.clone(),
            player_id,
            reason,
        }))
        .await?;

        lock(&self.shared.state).leave_room();
        self.shared.stop_heartbeat();
        info!(room = %room_id, "left room");
        Ok(())
    }

    /// Report the local player's ready flag. Changes come back to everyone,
    /// including this client, as `player_ready_changed` events.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotInRoom`] without sending anything if not in a room.
    pub async fn set_ready(&self, is_ready: bool) -> Result<()> {
        let (room_id, player_id) = self.membership()?;
        self.request(ClientMessage::ReadyStatus(ReadyStatusRequest {
            room_id,
            player_id,
            is_ready,
        }))
        .await
        .map(drop)
    }

    /// Send a chat line to the room. Delivery, including to this client,
    /// happens through the `chat_message` event.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotInRoom`] without sending anything if not in a room.
    pub async fn send_chat_message(&self, text: impl Into<String>) -> Result<()> {
        let (room_id, player_id) = self.membership()?;
        self.request(ClientMessage::ChatMessage(ChatMessageRequest {
            room_id,
            player_id,
            message: text.into(),
        }))
        .await
        .map(drop)
    }

    /// Request a state snapshot, e.g. after reconnecting or missing events.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotInRoom`] without sending anything if not in a room.
    pub async fn request_sync(&self, sync_type: SyncType) -> Result<Value> {
        let (room_id, player_id) = self.membership()?;
        self.request(ClientMessage::RequestSync(SyncRequest {
            room_id,
            player_id,
            sync_type,
        }))
        .await
    }

    /// Submit a battle action stamped with the current time. Does not require
    /// room membership.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] or [`ClientError::ServerRejected`].
    pub async fn send_battle_action(
        &self,
        action_type: impl Into<String>,
        target_id: Option<String>,
        ability_id: Option<String>,
    ) -> Result<()> {
        let player_id = self.local_player_id();
        self.request(ClientMessage::BattleTurn(BattleTurnRequest {
            player_id,
            action_type: action_type.into(),
            target_id,
            ability_id,
            timestamp: now_millis(),
        }))
        .await
        .map(drop)
    }

    /// Submit a scenario choice. Other players only learn that a choice was
    /// made, through `scenario_choice_made`.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] or [`ClientError::ServerRejected`].
    pub async fn send_scenario_choice(
        &self,
        scenario_id: impl Into<String>,
        choice_id: impl Into<String>,
    ) -> Result<()> {
        let player_id = self.local_player_id();
        self.request(ClientMessage::ScenarioChoice(ScenarioChoiceRequest {
            player_id,
            scenario_id: scenario_id.into(),
            choice_id: choice_id.into(),
        }))
        .await
        .map(drop)
    }

    /// Hand a clue to another player, who receives `clue_received`.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] or [`ClientError::ServerRejected`].
    pub async fn share_clue(
        &self,
        target_player_id: impl Into<PlayerId>,
        clue_id: impl Into<String>,
    ) -> Result<()> {
        let player_id = self.local_player_id();
        self.request(ClientMessage::ShareClue(ShareClueRequest {
            player_id,
            target_player_id: target_player_id.into(),
            clue_id: clue_id.into(),
        }))
        .await
        .map(drop)
    }

    // ── Events ──────────────────────────────────────────────────────

    /// Register `handler` for `name`. The same handle may be registered twice.
    pub fn on(&self, name: EventName, handler: Handler) {
        self.shared.dispatcher.subscribe(name, handler);
    }

    /// Remove one registration of `handler` for `name`.
    pub fn off(&self, name: EventName, handler: &Handler) -> bool {
        self.shared.dispatcher.unsubscribe(name, handler)
    }

    // ── State accessors ─────────────────────────────────────────────

    pub fn status(&self) -> ClientStatus {
        lock(&self.shared.state).status()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        lock(&self.shared.state).connection_status
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.shared.state).is_connected()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        lock(&self.shared.state).reconnect_attempts
    }

    pub fn is_heartbeat_running(&self) -> bool {
        lock(&self.shared.heartbeat).is_running()
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn membership(&self) -> Result<(RoomId, PlayerId)> {
        lock(&self.shared.state)
            .membership()
            .ok_or(ClientError::NotInRoom)
    }

    fn local_player_id(&self) -> Option<PlayerId> {
        lock(&self.shared.state).local_player_id.clone()
    }

    /// Register a waiter and queue `message` for the session task.
    ///
    /// The state lock is held until the frame is queued. `on_lost` takes the
    /// same lock to reject waiters and drain the queue, so a request is either
    /// drained with the old connection or refused as not connected.
    fn queue(&self, message: ClientMessage) -> Result<PendingAck> {
        let session = self.session.as_ref().ok_or(ClientError::NotConnected)?;
        let state = lock(&self.shared.state);
        if !state.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let ack = lock(&self.shared.pending).register();
        let frame = ClientFrame {
            id: Some(ack.request_id()),
            message,
        };
        if session.cmd_tx.send(Command::Send(frame)).is_err() {
            lock(&self.shared.pending).remove(ack.request_id());
            return Err(ClientError::NotConnected);
        }
        drop(state);
        Ok(ack)
    }

    async fn request(&self, message: ClientMessage) -> Result<Value> {
        let kind = message.kind();
        let ack = self.queue(message)?;
        let request_id = ack.request_id();
        let result = ack.await?.into_result();
        if let Err(err) = &result {
            debug!(request_id, kind, "request rejected: {err}");
        }
        result
    }
}

impl std::fmt::Debug for MultiplayerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.shared.state).clone();
        f.debug_struct("MultiplayerClient")
            .field("connection_status", &state.connection_status)
            .field("current_room", &state.current_room_id)
            .field("has_session", &self.session.is_some())
            .finish()
    }
}

impl Drop for MultiplayerClient {
    fn drop(&mut self) {
        // `Drop` is synchronous so we cannot await a graceful close; aborting
        // the task drops the transport immediately.
        self.shared.stop_heartbeat();
        if let Some(session) = self.session.take() {
            session.task.abort();
        }
    }
}

// ── Session loop ────────────────────────────────────────────────────

/// Why a single connection ended.
enum ConnectionEnd {
    /// `disconnect()` or the client handle went away.
    Shutdown,
    /// The transport failed or the server closed it.
    Lost(Option<String>),
}

struct SessionLoop {
    connector: Arc<dyn Connector>,
    config: ClientConfig,
    shared: Arc<Shared>,
    /// Restarts the heartbeat on every new connection without keeping the
    /// command channel open.
    cmd_tx: mpsc::WeakUnboundedSender<Command>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    shutdown_rx: oneshot::Receiver<()>,
    ready_tx: Option<oneshot::Sender<Result<()>>>,
}

impl SessionLoop {
    /// Connect, drive the connection, and reconnect until shutdown or the
    /// attempt cap.
    async fn run(mut self) {
        debug!("session task started");
        let policy = self.config.reconnect.clone();
        let mut backoff = Backoff::new(&policy);

        loop {
            lock(&self.shared.state).connection_status = ConnectionStatus::Connecting;

            let attempt = tokio::select! {
                biased;
                _ = &mut self.shutdown_rx => {
                    debug!("shutdown while connecting");
                    return;
                }
                result = tokio::time::timeout(policy.connect_timeout, self.connector.connect()) => {
                    result.unwrap_or(Err(ClientError::Timeout))
                }
            };

            match attempt {
                Ok(transport) => {
                    backoff.reset();
                    match self.drive(transport).await {
                        ConnectionEnd::Shutdown => break,
                        ConnectionEnd::Lost(reason) => {
                            self.on_lost(reason);
                            if !policy.enabled {
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(attempt = backoff.attempts(), "connection attempt failed: {err}");
                    lock(&self.shared.state).connection_status = ConnectionStatus::Disconnected;
                    if !policy.enabled {
                        self.signal_ready(Err(err));
                        break;
                    }
                }
            }

            let Some(delay) = backoff.next_delay_and_advance() else {
                let attempts = backoff.attempts();
                error!(attempts, "reconnection attempts exhausted; giving up");
                lock(&self.shared.state).connection_status = ConnectionStatus::Disconnected;
                self.publish(ClientEvent::ReconnectFailed { attempts });
                self.signal_ready(Err(ClientError::ReconnectExhausted { attempts }));
                break;
            };

            tokio::select! {
                biased;
                _ = &mut self.shutdown_rx => {
                    debug!("shutdown during reconnect delay");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }

            let attempt = backoff.attempts();
            lock(&self.shared.state).reconnect_attempts = attempt;
            info!(
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "reconnecting"
            );
            self.publish(ClientEvent::Reconnecting { attempt });
        }

        debug!("session task exited");
    }

    /// Run one established connection until it ends.
    async fn drive(&mut self, mut transport: Box<dyn Transport>) -> ConnectionEnd {
        let connection_id = lock(&self.shared.state).mark_connected();
        info!(%connection_id, "connected");
        self.shared.start_heartbeat(&self.cmd_tx);
        self.publish(ClientEvent::Connected { connection_id });
        self.signal_ready(Ok(()));

        loop {
            tokio::select! {
                biased;

                // Branch 1: shutdown signal
                _ = &mut self.shutdown_rx => {
                    debug!("shutdown signal received");
                    if let Err(err) = transport.close().await {
                        debug!("transport close failed: {err}");
                    }
                    return ConnectionEnd::Shutdown;
                }

                // Branch 2: outgoing work from the client handle
                cmd = self.cmd_rx.recv() => {
                    let frame = match cmd {
                        Some(Command::Send(frame)) => Some(frame),
                        Some(Command::Heartbeat) => heartbeat_frame(&self.shared),
                        None => {
                            debug!("client handle dropped, shutting down session");
                            let _ = transport.close().await;
                            return ConnectionEnd::Shutdown;
                        }
                    };
                    if let Some(frame) = frame {
                        let sent = send_frame(&self.shared, transport.as_mut(), frame).await;
                        if let Err(reason) = sent {
                            return ConnectionEnd::Lost(Some(reason));
                        }
                    }
                }

                // Branch 3: incoming frame from the server
                incoming = transport.recv() => {
                    match incoming {
                        Some(Ok(text)) => handle_incoming(&self.shared, &text),
                        Some(Err(err)) => {
                            error!("transport receive error: {err}");
                            let reason = format!("transport receive error: {err}");
                            return ConnectionEnd::Lost(Some(reason));
                        }
                        None => {
                            debug!("transport closed by server");
                            return ConnectionEnd::Lost(None);
                        }
                    }
                }
            }
        }
    }

    /// Record an unexpected loss. Room membership is kept for a rejoin.
    fn on_lost(&mut self, reason: Option<String>) {
        // Same lock as `queue`: nothing can be registered between the reject
        // and the drain.
        let (rejected, dropped) = {
            let mut state = lock(&self.shared.state);
            state.mark_disconnected();
            let rejected = lock(&self.shared.pending).reject_all();
            let mut dropped = 0usize;
            while self.cmd_rx.try_recv().is_ok() {
                dropped += 1;
            }
            (rejected, dropped)
        };
        self.shared.stop_heartbeat();
        warn!(
            reason = reason.as_deref().unwrap_or("closed by server"),
            rejected, dropped, "connection lost"
        );

        self.publish(ClientEvent::Disconnected { reason });
    }

    fn publish(&self, event: ClientEvent) {
        self.shared.dispatcher.publish(&event);
    }

    fn signal_ready(&mut self, result: Result<()>) {
        if let Some(tx) = self.ready_tx.take() {
            let _ = tx.send(result);
        }
    }
}

/// Serialize and send one frame. Returns the loss reason on transport failure.
async fn send_frame(
    shared: &Shared,
    transport: &mut dyn Transport,
    frame: ClientFrame,
) -> std::result::Result<(), String> {
    let json = match serde_json::to_string(&frame) {
        Ok(json) => json,
        Err(err) => {
            // Serialization errors are programming bugs; don't kill the connection.
            error!("failed to serialize client frame: {err}");
            if let Some(id) = frame.id {
                lock(&shared.pending).remove(id);
            }
            return Ok(());
        }
    };
    debug!(kind = frame.message.kind(), request_id = ?frame.id, "sending frame");
    transport.send(json).await.map_err(|err| {
        error!("transport send error: {err}");
        format!("transport send error: {err}")
    })
}

/// Build a heartbeat if still connected and in a room.
///
/// Heartbeats carry no correlation id: the server's reply is not awaited.
fn heartbeat_frame(shared: &Shared) -> Option<ClientFrame> {
    let (room_id, player_id) = {
        let state = lock(&shared.state);
        if !state.is_connected() {
            return None;
        }
        state.membership()?
    };
    Some(ClientFrame {
        id: None,
        message: ClientMessage::Heartbeat(HeartbeatRequest {
            room_id,
            player_id,
            timestamp: now_millis(),
        }),
    })
}

/// Route an acknowledgement or relay a pushed event.
fn handle_incoming(shared: &Shared, text: &str) {
    match serde_json::from_str::<ServerFrame>(text) {
        Ok(ServerFrame::Ack(ack)) => {
            debug!(request_id = ack.id, success = ack.success, "acknowledgement received");
            lock(&shared.pending).resolve(ack);
        }
        Ok(ServerFrame::Event { event }) => {
            apply_membership(shared, &event);
            shared.dispatcher.publish(&ClientEvent::from(event));
        }
        Err(err) => {
            warn!("failed to deserialize server frame: {err}; raw: {text}");
        }
    }
}

/// A `player_left` naming the local player means the server removed us.
fn apply_membership(shared: &Shared, event: &ServerEvent) {
    let ServerEvent::PlayerLeft(payload) = event else {
        return;
    };
    let removed = {
        let mut state = lock(&shared.state);
        let is_self = state.in_room()
            && state.local_player_id.as_deref() == Some(payload.player_id.as_str());
        if is_self {
            state.leave_room();
        }
        is_self
    };
    if removed {
        info!(player = %payload.player_id, "removed from room by server");
        shared.stop_heartbeat();
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::reconnect::ReconnectPolicy;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Connector whose every attempt fails.
    struct Unreachable {
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Connector for Unreachable {
        async fn connect(&self) -> Result<Box<dyn Transport>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::ConnectFailed("unreachable".into()))
        }
    }

    fn offline_client(policy: ReconnectPolicy) -> (MultiplayerClient, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = Unreachable {
            attempts: Arc::clone(&attempts),
        };
        let config = ClientConfig::default().with_reconnect(policy);
        (MultiplayerClient::new(connector, config), attempts)
    }

    #[tokio::test]
    async fn join_before_connect_is_not_connected() {
        let (client, _) = offline_client(ReconnectPolicy::disabled());
        let err = client
            .join_room(JoinRoomParams::new("room1", "p1", "Alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert!(client.status().current_room.is_none());
    }

    #[tokio::test]
    async fn in_room_operations_fail_fast_without_room() {
        let (client, _) = offline_client(ReconnectPolicy::disabled());
        assert!(matches!(
            client.set_ready(true).await,
            Err(ClientError::NotInRoom)
        ));
        assert!(matches!(
            client.send_chat_message("hi").await,
            Err(ClientError::NotInRoom)
        ));
        assert!(matches!(
            client.request_sync(SyncType::Full).await,
            Err(ClientError::NotInRoom)
        ));
    }

    #[tokio::test]
    async fn battle_action_needs_connection_not_room() {
        let (client, _) = offline_client(ReconnectPolicy::disabled());
        let err = client
            .send_battle_action("attack", Some("goblin".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[tokio::test]
    async fn leave_without_room_resolves_immediately() {
        let (client, _) = offline_client(ReconnectPolicy::disabled());
        client.leave_room(LeaveReason::Manual).await.unwrap();
    }

    #[tokio::test]
    async fn connect_without_reconnection_returns_first_error() {
        let (mut client, attempts) = offline_client(ReconnectPolicy::disabled());
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectFailed(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(client.connection_status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn connect_retries_then_reports_exhaustion() {
        let policy = ReconnectPolicy::default()
            .with_max_attempts(2)
            .with_delays(Duration::from_millis(1), Duration::from_millis(2));
        let (mut client, attempts) = offline_client(policy);

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::ReconnectExhausted { attempts: 2 }));
        // One initial attempt plus two retries.
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(client.reconnect_attempts(), 2);
    }

    #[tokio::test]
    async fn double_disconnect_does_not_panic() {
        let (mut client, _) = offline_client(ReconnectPolicy::disabled());
        client.disconnect().await;
        client.disconnect().await;
        assert_eq!(client.connection_status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn debug_impl_for_client() {
        let (client, _) = offline_client(ReconnectPolicy::disabled());
        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("MultiplayerClient"));
        assert!(debug_str.contains("connection_status"));
    }

    #[test]
    fn join_room_params_builder() {
        let params = JoinRoomParams::new("room1", "p1", "Alice");
        assert!(!params.rejoin);
        let params = params.with_rejoin(true);
        assert_eq!(params.player_id, "p1");
        assert_eq!(params.player_name, "Alice");
        assert!(params.rejoin);
    }
}
