//! Auto-hide timers.
//!
//! One cancellable deferred task per download id. When a timer fires it sends
//! `AutoHideExpired` to the manager; the generation number lets the manager
//! discard expirations from timers that were cancelled or replaced.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::managers::download_manager::ManagerEvent;
use crate::types::download::DownloadId;

struct Timer {
    generation: u64,
    task: JoinHandle<()>,
}

/// Pending auto-hide removals keyed by download id.
pub struct AutoHideTimers {
    timers: HashMap<DownloadId, Timer>,
    next_generation: u64,
    events: UnboundedSender<ManagerEvent>,
}

impl AutoHideTimers {
    pub fn new(events: UnboundedSender<ManagerEvent>) -> Self {
        Self {
            timers: HashMap::new(),
            next_generation: 0,
            events,
        }
    }

    /// Schedules removal of `id` after `delay`, replacing any pending timer for it.
    pub fn schedule(&mut self, id: DownloadId, delay: Duration) {
        self.cancel(id);

        self.next_generation += 1;
        let generation = self.next_generation;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ManagerEvent::AutoHideExpired { id, generation });
        });

        tracing::debug!(id, delay_secs = delay.as_secs(), "auto-hide scheduled");
        self.timers.insert(id, Timer { generation, task });
    }

    /// Cancels the pending timer for `id`. Returns false if none was pending.
    pub fn cancel(&mut self, id: DownloadId) -> bool {
        match self.timers.remove(&id) {
            Some(timer) => {
                timer.task.abort();
                true
            }
            None => false,
        }
    }

    /// Consumes an expiration. Returns true if it belongs to the live timer for `id`.
    pub fn take_expired(&mut self, id: DownloadId, generation: u64) -> bool {
        match self.timers.get(&id) {
            Some(timer) if timer.generation == generation => {
                self.timers.remove(&id);
                true
            }
            _ => false,
        }
    }

    pub fn is_scheduled(&self, id: DownloadId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn cancel_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
    }
}

impl Drop for AutoHideTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
