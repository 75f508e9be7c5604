//! Client configuration.

use std::time::Duration;

use crate::heartbeat::DEFAULT_HEARTBEAT_INTERVAL;
use crate::reconnect::ReconnectPolicy;

/// Default timeout for the graceful shutdown in `disconnect()`.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for a [`MultiplayerClient`](crate::MultiplayerClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taleweave_multiplayer::{ClientConfig, ReconnectPolicy};
///
/// let config = ClientConfig::default()
///     .with_reconnect(ReconnectPolicy::default().with_max_attempts(8))
///     .with_heartbeat_interval(Duration::from_secs(15));
/// assert_eq!(config.reconnect.max_attempts, 8);
/// assert_eq!(config.heartbeat_interval, Duration::from_secs(15));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Reconnection behaviour and per-attempt connect timeout.
    pub reconnect: ReconnectPolicy,
    /// Interval between heartbeats while in a room.
    ///
    /// Defaults to **30 seconds**.
    pub heartbeat_interval: Duration,
    /// How long `disconnect()` waits for the session task to close the
    /// transport before aborting it.
    ///
    /// Defaults to **1 second**. A zero timeout aborts immediately.
    pub shutdown_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
