//! Request/acknowledgement correlation.
//!
//! Each outbound request takes the next [`RequestId`] and parks a oneshot
//! sender in [`PendingRequests`]. The caller holds the matching
//! [`PendingAck`], which resolves when the session task routes the
//! acknowledgement back, or fails with [`ClientError::TransportLost`] if the
//! entry is dropped first.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::protocol::{Acknowledgement, RequestId};

/// In-flight requests keyed by correlation id.
#[derive(Debug, Default)]
pub struct PendingRequests {
    next_id: RequestId,
    inner: HashMap<RequestId, oneshot::Sender<Acknowledgement>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id and register a waiter for its acknowledgement.
    pub fn register(&mut self) -> PendingAck {
        self.next_id = self.next_id.wrapping_add(1);
        let id = self.next_id;
        let (tx, rx) = oneshot::channel();
        self.inner.insert(id, tx);
        PendingAck { id, rx }
    }

    /// Route an acknowledgement to its waiter.
    ///
    /// Returns `false` if no request with that id is pending.
    pub fn resolve(&mut self, ack: Acknowledgement) -> bool {
        match self.inner.remove(&ack.id) {
            Some(tx) => {
                // The waiter may have been dropped; that is not an error.
                let _ = tx.send(ack);
                true
            }
            None => {
                debug!(request_id = ack.id, "acknowledgement for unknown request");
                false
            }
        }
    }

    pub fn remove(&mut self, id: RequestId) -> bool {
        self.inner.remove(&id).is_some()
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.inner.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every waiter; their [`PendingAck`]s fail with `TransportLost`.
    pub fn reject_all(&mut self) -> usize {
        let count = self.inner.len();
        self.inner.clear();
        count
    }
}

/// Future resolving to the acknowledgement of one request.
#[derive(Debug)]
#[must_use = "a PendingAck does nothing unless awaited"]
pub struct PendingAck {
    id: RequestId,
    rx: oneshot::Receiver<Acknowledgement>,
}

impl PendingAck {
    pub fn request_id(&self) -> RequestId {
        self.id
    }
}

impl Future for PendingAck {
    type Output = Result<Acknowledgement>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| ClientError::TransportLost))
    }
}
