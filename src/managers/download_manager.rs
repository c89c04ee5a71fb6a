//! Download Manager.
//!
//! Owns the tracked set of download records and reconciles it with the host.
//! All mutation happens inside one event loop ([`DownloadManager::run`]), so
//! a poll tick and a completion event never interleave; each operation
//! replaces the tracked set only after its host calls have resolved.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::managers::autohide::AutoHideTimers;
use crate::managers::download_record::DownloadRecord;
use crate::managers::polling::PollScheduler;
use crate::platform::{DownloadHost, EraseQuery, PresentationSurface};
use crate::services::filter_policy::{is_retained, should_auto_hide, should_ignore};
use crate::services::options_store::{apply_change, OptionsStore, OptionsStoreTrait};
use crate::types::download::{
    DownloadDelta, DownloadId, DownloadItem, DownloadState, SerializedDownload,
};
use crate::types::errors::HostError;
use crate::types::message::{IntentEvent, SurfaceId, SurfaceMessage};
use crate::types::options::{OptionsChange, SyncOptions};

/// Everything the manager reacts to, in arrival order.
#[derive(Debug, Clone)]
pub enum ManagerEvent {
    Created(DownloadItem),
    Changed(DownloadDelta),
    Intent(IntentEvent),
    OptionsChanged(OptionsChange),
    SurfaceReady(SurfaceId),
    PollTick,
    AutoHideExpired { id: DownloadId, generation: u64 },
    Shutdown,
}

/// Trait defining the download manager's host events and user actions.
#[async_trait]
pub trait DownloadManagerTrait {
    async fn on_created(&mut self, item: DownloadItem);
    async fn on_changed(&mut self, delta: DownloadDelta);
    async fn poll_tick(&mut self);
    async fn refresh(&mut self);
    async fn clear_download(&mut self, download: SerializedDownload);
    async fn clear_all_downloads(&mut self);
    async fn open_download(&mut self, download: SerializedDownload);
    async fn show_download(&mut self, download: SerializedDownload);
    async fn cancel_download(&mut self, download: SerializedDownload);
    async fn pause_download(&mut self, download: SerializedDownload);
    async fn resume_download(&mut self, download: SerializedDownload);
    async fn delete_download(&mut self, download: SerializedDownload);
    async fn open_options(&mut self);
    fn snapshot(&self) -> Vec<SerializedDownload>;
}

/// Reconciliation engine for the downloads shown in the status bar.
pub struct DownloadManager {
    host: Arc<dyn DownloadHost>,
    surface: Arc<dyn PresentationSurface>,
    options: SyncOptions,
    options_store: Option<Arc<Mutex<OptionsStore>>>,
    downloads: IndexMap<DownloadId, DownloadRecord>,
    poller: PollScheduler,
    auto_hide: AutoHideTimers,
    events: UnboundedSender<ManagerEvent>,
}

impl DownloadManager {
    /// Creates a manager and the receiving end of its event channel.
    pub fn new(
        host: Arc<dyn DownloadHost>,
        surface: Arc<dyn PresentationSurface>,
        options: SyncOptions,
    ) -> (Self, UnboundedReceiver<ManagerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            host,
            surface,
            options,
            options_store: None,
            downloads: IndexMap::new(),
            poller: PollScheduler::new(events.clone()),
            auto_hide: AutoHideTimers::new(events.clone()),
            events,
        };
        (manager, rx)
    }

    /// Persists option writes made by the manager (the `minimized` flag) to `store`.
    pub fn with_options_store(mut self, store: Arc<Mutex<OptionsStore>>) -> Self {
        self.options_store = Some(store);
        self
    }

    /// A sender that feeds this manager's event loop.
    pub fn sender(&self) -> UnboundedSender<ManagerEvent> {
        self.events.clone()
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn poll_period(&self) -> Option<std::time::Duration> {
        self.poller.period()
    }

    pub fn get(&self, id: DownloadId) -> Option<&DownloadRecord> {
        self.downloads.get(&id)
    }

    pub fn tracked_ids(&self) -> Vec<DownloadId> {
        self.downloads.keys().copied().collect()
    }

    pub fn is_auto_hide_pending(&self, id: DownloadId) -> bool {
        self.auto_hide.is_scheduled(id)
    }

    /// Processes events until `Shutdown` arrives or every sender is gone.
    pub async fn run(mut self, mut rx: UnboundedReceiver<ManagerEvent>) -> Self {
        while let Some(event) = rx.recv().await {
            if matches!(event, ManagerEvent::Shutdown) {
                break;
            }
            self.handle_event(event).await;
        }

        self.poller.stop();
        self.auto_hide.cancel_all();
        tracing::info!(tracked = self.downloads.len(), "download manager stopped");
        self
    }

    pub async fn handle_event(&mut self, event: ManagerEvent) {
        match event {
            ManagerEvent::Created(item) => self.on_created(item).await,
            ManagerEvent::Changed(delta) => self.on_changed(delta).await,
            ManagerEvent::Intent(intent) => self.handle_intent(intent).await,
            ManagerEvent::OptionsChanged(change) => self.apply_options_change(&change),
            ManagerEvent::SurfaceReady(surface) => self.on_surface_ready(surface).await,
            ManagerEvent::PollTick => self.poll_tick().await,
            ManagerEvent::AutoHideExpired { id, generation } => {
                if self.auto_hide.take_expired(id, generation) {
                    tracing::debug!(id, "auto-hiding download");
                    self.remove_and_refresh(id).await;
                }
            }
            ManagerEvent::Shutdown => {}
        }
    }

    pub async fn handle_intent(&mut self, intent: IntentEvent) {
        tracing::debug!(event = intent.name(), "handling intent");
        match intent {
            IntentEvent::ClearDownloads => self.clear_all_downloads().await,
            IntentEvent::ClearDownload { download } => self.clear_download(download).await,
            IntentEvent::OpenDownload { download } => self.open_download(download).await,
            IntentEvent::ShowDownload { download } => self.show_download(download).await,
            IntentEvent::CancelDownload { download } => self.cancel_download(download).await,
            IntentEvent::PauseDownload { download } => self.pause_download(download).await,
            IntentEvent::ResumeDownload { download } => self.resume_download(download).await,
            IntentEvent::DeleteDownload { download } => self.delete_download(download).await,
            IntentEvent::OpenOptions => self.open_options().await,
        }
    }

    /// Folds an options change into the live copy.
    ///
    /// A new refresh rate takes effect immediately on a running poller.
    pub fn apply_options_change(&mut self, change: &OptionsChange) {
        match apply_change(&self.options, change) {
            Ok(options) => {
                self.options = options;
                if change.contains("refreshRate") {
                    self.poller.restart(self.options.refresh_interval());
                }
            }
            Err(e) => tracing::warn!(error = %e, "ignoring options change"),
        }
    }

    /// Sends the current downloads to one surface that just became ready.
    pub async fn on_surface_ready(&mut self, surface: SurfaceId) {
        let message = self.message();
        if let Err(e) = self.surface.send_to(surface, &message).await {
            tracing::debug!(surface, error = %e, "failed to update surface");
        }
    }

    pub fn message(&self) -> SurfaceMessage {
        SurfaceMessage::UpdateDownloads {
            downloads: self.snapshot(),
        }
    }

    fn ensure_polling(&mut self) {
        self.poller.start(self.options.refresh_interval());
    }

    fn any_in_progress(&self) -> bool {
        self.downloads.values().any(|r| r.item().is_in_progress())
    }

    async fn broadcast(&self) {
        let message = self.message();
        if let Err(e) = self.surface.broadcast(&message).await {
            tracing::debug!(error = %e, "failed to broadcast downloads");
        }
    }

    fn remove(&mut self, id: DownloadId) -> Option<DownloadRecord> {
        self.auto_hide.cancel(id);
        self.downloads.shift_remove(&id)
    }

    async fn remove_and_refresh(&mut self, id: DownloadId) {
        self.remove(id);
        self.refresh().await;
    }

    fn set_not_minimized(&mut self) {
        self.options.minimized = false;

        if let Some(store) = &self.options_store {
            let result = match store.lock() {
                Ok(mut store) => store.set_value("minimized", Value::Bool(false)),
                Err(_) => return,
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "failed to persist minimized flag");
            }
        }
    }

    async fn play_sound_if_slow(&self, record: &DownloadRecord) {
        if !self.options.play_sound_on_complete {
            return;
        }

        // A threshold beyond chrono's range can never be reached.
        let threshold = match chrono::Duration::from_std(self.options.sound_threshold()) {
            Ok(threshold) => threshold,
            Err(_) => return,
        };
        let elapsed = Utc::now().signed_duration_since(record.item().start_time);
        if elapsed < threshold {
            return;
        }

        if let Err(e) = self.surface.play_completion_sound().await {
            tracing::debug!(error = %e, "failed to play completion sound");
        }
    }

    async fn after_action(&mut self, action: &str, id: DownloadId, result: Result<(), HostError>) {
        match result {
            Ok(()) => self.refresh().await,
            Err(e) => tracing::warn!(id, action, error = %e, "host rejected action"),
        }
    }
}

#[async_trait]
impl DownloadManagerTrait for DownloadManager {
    /// Starts tracking a new download unless it matches the ignore rules.
    async fn on_created(&mut self, item: DownloadItem) {
        let record = DownloadRecord::new(item);
        self.set_not_minimized();

        if should_ignore(record.item(), &self.options) {
            tracing::debug!(id = record.id(), "ignoring download");
            return;
        }

        tracing::info!(id = record.id(), filename = record.filename(), "tracking download");
        self.downloads.insert(record.id(), record);
        self.ensure_polling();
    }

    /// Applies a host change. Completion is handled here; anything else
    /// waits for the next poll.
    async fn on_changed(&mut self, delta: DownloadDelta) {
        if !delta.signals_completion() {
            self.ensure_polling();
            return;
        }

        let record = match self.downloads.get_mut(&delta.id) {
            Some(record) => record,
            None => return,
        };

        record.apply_delta(&delta);
        record.complete(Utc::now());
        let record = record.clone();
        tracing::info!(id = record.id(), "download complete");

        self.play_sound_if_slow(&record).await;

        if should_auto_hide(record.item(), &self.options) {
            self.auto_hide.schedule(record.id(), self.options.autohide_delay());
        }

        self.broadcast().await;
    }

    async fn poll_tick(&mut self) {
        if !self.poller.is_running() {
            return;
        }
        self.refresh().await;
    }

    /// Re-reads every tracked download from the host, drops the ones the
    /// host no longer knows, and broadcasts the result.
    async fn refresh(&mut self) {
        let ids: Vec<DownloadId> = self.downloads.keys().copied().collect();
        let host = self.host.clone();
        let results = join_all(ids.iter().map(|id| host.search(*id))).await;

        let now = Utc::now();
        let mut reconciled = IndexMap::with_capacity(ids.len());
        let mut vanished = Vec::new();

        for (id, result) in ids.into_iter().zip(results) {
            let mut record = match self.downloads.get(&id) {
                Some(record) => record.clone(),
                None => continue,
            };
            match result {
                Ok(item) if item.id == id => {
                    record.update(item, now);
                    reconciled.insert(id, record);
                }
                Ok(item) => {
                    tracing::debug!(id, returned = item.id, "host returned a different download");
                    vanished.push(id);
                }
                Err(e) => {
                    tracing::debug!(id, error = %e, "dropping download missing from host");
                    vanished.push(id);
                }
            }
        }

        for id in vanished {
            self.auto_hide.cancel(id);
        }
        self.downloads = reconciled;
        self.broadcast().await;

        if !self.any_in_progress() {
            self.poller.stop();
        }
    }

    async fn clear_download(&mut self, download: SerializedDownload) {
        let record = DownloadRecord::from_serialized(download);
        let id = record.id();
        tracing::debug!(id, "clearing download");
        self.remove_and_refresh(id).await;

        if self.options.clear_history {
            if let Err(e) = self.host.erase(EraseQuery::by_id(id)).await {
                tracing::warn!(id, error = %e, "failed to erase download history");
            }
        }
    }

    async fn clear_all_downloads(&mut self) {
        let include_failed = self.options.clear_failed;
        let cleared: Vec<DownloadId> = self
            .downloads
            .values()
            .filter(|r| !is_retained(r.item(), include_failed))
            .map(|r| r.id())
            .collect();
        tracing::debug!(count = cleared.len(), "clearing finished downloads");

        for id in cleared {
            self.remove(id);
        }
        self.refresh().await;

        if self.options.clear_history {
            if let Err(e) = self.host.erase(EraseQuery::by_state(DownloadState::Complete)).await {
                tracing::warn!(error = %e, "failed to erase completed downloads from history");
            }
        }
    }

    async fn open_download(&mut self, download: SerializedDownload) {
        let record = DownloadRecord::from_serialized(download);
        let id = record.id();

        if let Err(e) = self.host.open(id).await {
            tracing::warn!(id, error = %e, "failed to open download");
            return;
        }

        if self.options.clear_after_opening {
            self.clear_download(record.to_serialized()).await;
        } else {
            self.refresh().await;
        }
    }

    async fn show_download(&mut self, download: SerializedDownload) {
        let id = DownloadRecord::from_serialized(download).id();
        let result = self.host.show(id).await;
        self.after_action("show", id, result).await;
    }

    async fn cancel_download(&mut self, download: SerializedDownload) {
        let id = DownloadRecord::from_serialized(download).id();
        let result = self.host.cancel(id).await;
        self.after_action("cancel", id, result).await;
    }

    async fn pause_download(&mut self, download: SerializedDownload) {
        let record = DownloadRecord::from_serialized(download);
        let result = record.pause(self.host.as_ref()).await;
        self.after_action("pause", record.id(), result).await;
    }

    async fn resume_download(&mut self, download: SerializedDownload) {
        let record = DownloadRecord::from_serialized(download);
        let result = record.resume(self.host.as_ref()).await;
        if result.is_ok() {
            self.ensure_polling();
        }
        self.after_action("resume", record.id(), result).await;
    }

    /// Deletes the file from disk and stops tracking the download.
    async fn delete_download(&mut self, download: SerializedDownload) {
        let id = DownloadRecord::from_serialized(download).id();
        match self.host.remove_file(id).await {
            Ok(()) => {
                tracing::info!(id, "deleted download file");
                self.remove_and_refresh(id).await;
            }
            Err(e) => tracing::warn!(id, error = %e, "failed to delete download file"),
        }
    }

    async fn open_options(&mut self) {
        if let Err(e) = self.host.open_options_page().await {
            tracing::warn!(error = %e, "failed to open options page");
        }
    }

    fn snapshot(&self) -> Vec<SerializedDownload> {
        self.downloads.values().map(SerializedDownload::from).collect()
    }
}
