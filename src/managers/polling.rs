//! Polling scheduler.
//!
//! A two-state timer (Stopped/Running) that feeds `PollTick` events into the
//! manager's event channel. Starting a running scheduler and stopping a
//! stopped one are no-ops.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::managers::download_manager::ManagerEvent;
use crate::types::options::{MAX_REFRESH_RATE_MS, MIN_REFRESH_RATE_MS};

/// Keeps the period within the refresh-rate bounds; tokio rejects a zero period.
fn bounded(period: Duration) -> Duration {
    period.clamp(
        Duration::from_millis(MIN_REFRESH_RATE_MS),
        Duration::from_millis(MAX_REFRESH_RATE_MS),
    )
}

enum PollState {
    Stopped,
    Running {
        period: Duration,
        task: JoinHandle<()>,
    },
}

/// Drives periodic reconciliation while downloads are active.
pub struct PollScheduler {
    state: PollState,
    events: UnboundedSender<ManagerEvent>,
}

impl PollScheduler {
    pub fn new(events: UnboundedSender<ManagerEvent>) -> Self {
        Self {
            state: PollState::Stopped,
            events,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PollState::Running { .. })
    }

    /// The tick period while running.
    pub fn period(&self) -> Option<Duration> {
        match &self.state {
            PollState::Running { period, .. } => Some(*period),
            PollState::Stopped => None,
        }
    }

    /// Starts ticking every `period`. Returns false if already running.
    pub fn start(&mut self, period: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        let period = bounded(period);

        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(ManagerEvent::PollTick).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(period_ms = period.as_millis() as u64, "polling started");
        self.state = PollState::Running { period, task };
        true
    }

    /// Stops ticking. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.state, PollState::Stopped) {
            PollState::Running { task, .. } => {
                task.abort();
                tracing::debug!("polling stopped");
                true
            }
            PollState::Stopped => false,
        }
    }

    /// Restarts a running scheduler with a new period. A stopped scheduler stays stopped.
    pub fn restart(&mut self, period: Duration) {
        let period = bounded(period);
        if self.period().map_or(true, |current| current == period) {
            return;
        }
        self.stop();
        self.start(period);
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
