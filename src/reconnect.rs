//! Bounded reconnection policy and exponential backoff.

use std::time::Duration;

/// Default number of automatic reconnection attempts per cycle.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before the first reconnection attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1_000);

/// Default upper bound on the delay between attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5_000);

/// Default growth factor applied to the delay after each attempt.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default timeout for establishing one connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(20_000);

/// How the session reacts to a failed or lost connection.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taleweave_multiplayer::ReconnectPolicy;
///
/// let policy = ReconnectPolicy::default()
///     .with_max_attempts(3)
///     .with_delays(Duration::from_millis(100), Duration::from_millis(400));
/// assert_eq!(policy.max_attempts, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Whether lost or failed connections are retried automatically.
    pub enabled: bool,
    /// Attempts per cycle before `reconnect_failed` is published.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Timeout applied to every single connection attempt.
    pub connect_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ReconnectPolicy {
    /// A policy that never reconnects automatically.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the initial and maximum delay. `max` is raised to `initial` if smaller.
    #[must_use]
    pub fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max.max(initial);
        self
    }

    /// Values below `1.0` are clamped to `1.0`.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Attempt counter and delay progression for one reconnection cycle.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    delay: Duration,
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn new(policy: &ReconnectPolicy) -> Self {
        Self {
            attempts: 0,
            delay: policy.initial_delay,
            max_attempts: policy.max_attempts,
            initial_delay: policy.initial_delay,
            max_delay: policy.max_delay.max(policy.initial_delay),
            multiplier: policy.multiplier.max(1.0),
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.delay = self.initial_delay;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Advance to the next attempt.
    ///
    /// Returns the delay to wait *before* that attempt, or `None` once the
    /// attempt cap is reached.
    pub fn next_delay_and_advance(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let current = self.delay;
        self.attempts += 1;
        self.delay = Duration::try_from_secs_f64(self.delay.as_secs_f64() * self.multiplier)
            .map_or(self.max_delay, |next| next.min(self.max_delay));
        Some(current)
    }
}
