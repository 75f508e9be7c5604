//! Periodic liveness ticks while a room is joined.
//!
//! [`LivenessMonitor`] owns at most one background tick task. Each tick calls
//! the supplied closure; the session uses it to queue a heartbeat frame and
//! decides at send time whether one is still warranted. Presence timeouts are
//! the server's decision, so a missed tick is never an error here.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Default interval between heartbeats.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct LivenessMonitor {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl LivenessMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start ticking. The first tick fires one full interval from now.
    ///
    /// `tick` returns `false` to stop the monitor (e.g. its channel closed).
    /// Returns `false` without effect if the monitor is already running.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, mut tick: F) -> bool
    where
        F: FnMut() -> bool + Send + 'static,
    {
        if self.is_running() {
            return false;
        }
        let period = self.interval.max(Duration::from_millis(1));
        debug!(interval_ms = period.as_millis() as u64, "liveness monitor started");
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !tick() {
                    debug!("liveness monitor tick target gone; stopping");
                    break;
                }
            }
        }));
        true
    }

    /// Stop ticking. Returns `false` if the monitor was not running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                if was_running {
                    debug!("liveness monitor stopped");
                }
                was_running
            }
            None => false,
        }
    }
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_INTERVAL)
    }
}

impl Drop for LivenessMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
