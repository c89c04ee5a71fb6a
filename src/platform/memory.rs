//! In-memory host and presentation surface.
//!
//! `MemoryHost` keeps downloads in a map and applies pause/resume/cancel the
//! way a browser would; `RecordingSurface` records everything sent to it.
//! Both back the demo binary and the test suite.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::platform::{DownloadHost, EraseQuery, PresentationSurface};
use crate::types::download::{DownloadId, DownloadItem, DownloadState, CANCELED_BY_USER};
use crate::types::errors::HostError;
use crate::types::message::{SurfaceId, SurfaceMessage};

/// One call received by a [`MemoryHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostCall {
    pub method: &'static str,
    pub id: Option<DownloadId>,
}

#[derive(Default)]
struct HostState {
    downloads: IndexMap<DownloadId, DownloadItem>,
    calls: Vec<HostCall>,
    failing: HashSet<&'static str>,
}

/// Deterministic download host backed by a map.
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a download.
    pub fn insert(&self, item: DownloadItem) {
        self.lock().downloads.insert(item.id, item);
    }

    /// Mutates a stored download in place. Returns false if it is unknown.
    pub fn update<F>(&self, id: DownloadId, f: F) -> bool
    where
        F: FnOnce(&mut DownloadItem),
    {
        match self.lock().downloads.get_mut(&id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    /// Forgets a download, as if the host purged it.
    pub fn remove(&self, id: DownloadId) -> Option<DownloadItem> {
        self.lock().downloads.shift_remove(&id)
    }

    pub fn get(&self, id: DownloadId) -> Option<DownloadItem> {
        self.lock().downloads.get(&id).cloned()
    }

    /// Makes every later call to `method` fail with `HostError::Rejected`.
    pub fn fail(&self, method: &'static str) {
        self.lock().failing.insert(method);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received for `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.method == method).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        // A poisoned lock only means a test panicked mid-update; the map is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: &'static str, id: Option<DownloadId>) -> Result<(), HostError> {
        let mut state = self.lock();
        state.calls.push(HostCall { method, id });
        if state.failing.contains(method) {
            return Err(HostError::Rejected(format!("{} failed", method)));
        }
        Ok(())
    }

    fn modify<F>(&self, method: &'static str, id: DownloadId, f: F) -> Result<(), HostError>
    where
        F: FnOnce(&mut DownloadItem),
    {
        self.record(method, Some(id))?;
        let mut state = self.lock();
        let item = state.downloads.get_mut(&id).ok_or(HostError::NotFound(id))?;
        f(item);
        Ok(())
    }
}

#[async_trait]
impl DownloadHost for MemoryHost {
    async fn search(&self, id: DownloadId) -> Result<DownloadItem, HostError> {
        self.record("search", Some(id))?;
        self.get(id).ok_or(HostError::NotFound(id))
    }

    async fn pause(&self, id: DownloadId) -> Result<(), HostError> {
        self.modify("pause", id, |item| item.paused = true)
    }

    async fn resume(&self, id: DownloadId) -> Result<(), HostError> {
        self.modify("resume", id, |item| {
            item.paused = false;
            item.state = DownloadState::InProgress;
            item.error = None;
        })
    }

    async fn cancel(&self, id: DownloadId) -> Result<(), HostError> {
        self.modify("cancel", id, |item| {
            item.paused = false;
            item.state = DownloadState::Interrupted;
            item.error = Some(CANCELED_BY_USER.to_string());
        })
    }

    async fn remove_file(&self, id: DownloadId) -> Result<(), HostError> {
        self.modify("remove_file", id, |item| item.exists = false)
    }

    async fn erase(&self, query: EraseQuery) -> Result<Vec<DownloadId>, HostError> {
        self.record("erase", query.id)?;
        let mut state = self.lock();
        let erased: Vec<DownloadId> = state
            .downloads
            .values()
            .filter(|item| query.matches(item))
            .map(|item| item.id)
            .collect();
        state.downloads.retain(|id, _| !erased.contains(id));
        Ok(erased)
    }

    async fn open(&self, id: DownloadId) -> Result<(), HostError> {
        self.modify("open", id, |_| {})
    }

    async fn show(&self, id: DownloadId) -> Result<(), HostError> {
        self.modify("show", id, |_| {})
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        self.record("open_options_page", None)
    }
}

/// Something delivered to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Broadcast(SurfaceMessage),
    SendTo(SurfaceId, SurfaceMessage),
    Sound,
}

/// Presentation surface that records what it receives.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().clone()
    }

    /// The most recent broadcast message, if any.
    pub fn last_broadcast(&self) -> Option<SurfaceMessage> {
        self.lock().iter().rev().find_map(|event| match event {
            SurfaceEvent::Broadcast(message) => Some(message.clone()),
            _ => None,
        })
    }

    pub fn broadcast_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Broadcast(_)))
            .count()
    }

    pub fn sound_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Sound))
            .count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SurfaceEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PresentationSurface for RecordingSurface {
    async fn broadcast(&self, message: &SurfaceMessage) -> Result<(), HostError> {
        self.lock().push(SurfaceEvent::Broadcast(message.clone()));
        Ok(())
    }

    async fn send_to(&self, surface: SurfaceId, message: &SurfaceMessage) -> Result<(), HostError> {
        self.lock().push(SurfaceEvent::SendTo(surface, message.clone()));
        Ok(())
    }

    async fn play_completion_sound(&self) -> Result<(), HostError> {
        self.lock().push(SurfaceEvent::Sound);
        Ok(())
    }
}
