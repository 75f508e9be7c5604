#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for Taleweave multiplayer integration tests.
//!
//! Provides an in-process [`LoopbackTransport`] paired with a scriptable
//! [`MockServer`], and a [`ScriptedConnector`] that hands out one transport
//! per connection attempt.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use taleweave_multiplayer::protocol::{
    Acknowledgement, ClientFrame, ClientMessage, RequestId, ServerEvent, ServerFrame,
};
use taleweave_multiplayer::{
    handler, ClientConfig, ClientError, ClientEvent, Connector, EventName, MultiplayerClient,
    ReconnectPolicy, Transport,
};

/// How long helpers wait before declaring a frame or event missing.
pub const WAIT: Duration = Duration::from_secs(2);

// ── LoopbackTransport ───────────────────────────────────────────────

/// Client end of an in-process connection.
///
/// `recv` yields `None` once the paired [`MockServer`] is dropped, which the
/// client treats as a lost connection.
pub struct LoopbackTransport {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, message: String) -> Result<(), ClientError> {
        self.outgoing
            .send(message)
            .map_err(|_| ClientError::TransportSend("server gone".into()))
    }

    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ── MockServer ──────────────────────────────────────────────────────

/// Server end of an in-process connection.
pub struct MockServer {
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

/// Create a connected transport/server pair.
pub fn loopback() -> (LoopbackTransport, MockServer) {
    let (to_client, incoming) = mpsc::unbounded_channel();
    let (outgoing, from_client) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));
    let transport = LoopbackTransport {
        incoming,
        outgoing,
        closed: Arc::clone(&closed),
    };
    let server = MockServer {
        to_client,
        from_client,
        closed,
    };
    (transport, server)
}

impl MockServer {
    /// Wait for the next frame the client sends.
    pub async fn next_frame(&mut self) -> ClientFrame {
        let text = tokio::time::timeout(WAIT, self.from_client.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client transport dropped");
        serde_json::from_str(&text).expect("client sent an invalid frame")
    }

    /// The next frame, which must be a request (carrying an id).
    pub async fn next_request(&mut self) -> (RequestId, ClientMessage) {
        let frame = self.next_frame().await;
        let id = frame.id.expect("request frame without an id");
        (id, frame.message)
    }

    /// A frame already queued by the client, if any.
    pub fn try_next_frame(&mut self) -> Option<ClientFrame> {
        self.from_client
            .try_recv()
            .ok()
            .map(|text| serde_json::from_str(&text).expect("client sent an invalid frame"))
    }

    pub fn send_frame(&self, frame: &ServerFrame) {
        self.send_raw(&serde_json::to_string(frame).unwrap());
    }

    pub fn send_raw(&self, text: &str) {
        let _ = self.to_client.send(text.to_string());
    }

    pub fn ack(&self, id: RequestId, data: Option<Value>) {
        self.send_frame(&ServerFrame::Ack(Acknowledgement::ok(id, data)));
    }

    pub fn reject(&self, id: RequestId, error: &str) {
        self.send_frame(&ServerFrame::Ack(Acknowledgement::rejected(id, error)));
    }

    pub fn push(&self, event: ServerEvent) {
        self.send_frame(&ServerFrame::Event { event });
    }

    /// Whether the client closed its end gracefully.
    pub fn client_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Simulate an unexpected connection loss.
    pub fn drop_connection(self) {
        drop(self);
    }
}

// ── ScriptedConnector ───────────────────────────────────────────────

enum Script {
    Accept(LoopbackTransport),
    Hang,
}

/// Connector fed by the test. An attempt with nothing scripted fails.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    queue: Arc<StdMutex<VecDeque<Script>>>,
    attempts: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next attempt succeed and return its server end.
    pub fn accept_next(&self) -> MockServer {
        let (transport, server) = loopback();
        self.queue
            .lock()
            .unwrap()
            .push_back(Script::Accept(transport));
        server
    }

    /// Make the next attempt never complete.
    pub fn hang_next(&self) {
        self.queue.lock().unwrap().push_back(Script::Hang);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, ClientError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(Script::Accept(transport)) => Ok(Box::new(transport)),
            Some(Script::Hang) => std::future::pending().await,
            None => Err(ClientError::ConnectFailed("connection refused".into())),
        }
    }
}

// ── Client helpers ──────────────────────────────────────────────────

/// Short delays so reconnection tests finish quickly in real time.
pub fn fast_config() -> ClientConfig {
    ClientConfig::default()
        .with_reconnect(
            ReconnectPolicy::default()
                .with_max_attempts(3)
                .with_delays(Duration::from_millis(10), Duration::from_millis(40)),
        )
        .with_heartbeat_interval(Duration::from_secs(30))
        .with_shutdown_timeout(Duration::from_millis(200))
}

pub fn client_with(config: ClientConfig) -> (MultiplayerClient, ScriptedConnector) {
    let connector = ScriptedConnector::new();
    let client = MultiplayerClient::new(connector.clone(), config);
    (client, connector)
}

/// Forward every event named in `names` into a channel.
pub fn record(
    client: &MultiplayerClient,
    names: &[EventName],
) -> mpsc::UnboundedReceiver<ClientEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    for &name in names {
        let tx = tx.clone();
        client.on(
            name,
            handler(move |event| {
                let _ = tx.send(event.clone());
            }),
        );
    }
    rx
}

/// Record every event the client can publish.
pub fn record_all(client: &MultiplayerClient) -> mpsc::UnboundedReceiver<ClientEvent> {
    record(client, &EventName::ALL)
}

pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Connect against a freshly scripted server.
pub async fn connected(
    client: &mut MultiplayerClient,
    connector: &ScriptedConnector,
) -> MockServer {
    let server = connector.accept_next();
    client.connect().await.expect("connect should succeed");
    server
}
