//! App context for the download status engine.
//!
//! Constructed once at process start. Owns the options store, runs the
//! download manager on its own task and hands out the event sender that every
//! host callback and surface message goes through.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::managers::download_manager::{DownloadManager, ManagerEvent};
use crate::message_handler;
use crate::platform::{DownloadHost, PresentationSurface};
use crate::services::options_store::{apply_change, OptionsStore, OptionsStoreTrait};
use crate::types::download::{DownloadDelta, DownloadItem};
use crate::types::errors::OptionsError;
use crate::types::message::SurfaceId;
use crate::types::options::OptionsChange;

/// Installs the stderr log subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Stdout stays free for the bridge protocol. Calling this twice is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Running engine: the manager task plus the options forwarding task.
pub struct App {
    options_store: Arc<Mutex<OptionsStore>>,
    events: UnboundedSender<ManagerEvent>,
    manager: JoinHandle<DownloadManager>,
    options_forwarder: JoinHandle<()>,
}

impl App {
    /// Starts the engine. Must be called from within a tokio runtime.
    ///
    /// The manager starts from the store's current options and receives every
    /// later change published by the store.
    pub fn start(
        host: Arc<dyn DownloadHost>,
        surface: Arc<dyn PresentationSurface>,
        options_store: OptionsStore,
    ) -> Self {
        let options = options_store.get().clone();
        let mut changes = options_store.subscribe();
        let options_store = Arc::new(Mutex::new(options_store));

        let (manager, rx) = DownloadManager::new(host, surface, options);
        let manager = manager.with_options_store(options_store.clone());
        let events = manager.sender();

        let forward_to = events.clone();
        let options_forwarder = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        if forward_to.send(ManagerEvent::OptionsChanged(change)).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "options changes dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let manager = tokio::spawn(manager.run(rx));
        tracing::info!("download status engine started");

        Self {
            options_store,
            events,
            manager,
            options_forwarder,
        }
    }

    pub fn events(&self) -> UnboundedSender<ManagerEvent> {
        self.events.clone()
    }

    pub fn options_store(&self) -> Arc<Mutex<OptionsStore>> {
        self.options_store.clone()
    }

    pub fn download_created(&self, item: DownloadItem) {
        self.send(ManagerEvent::Created(item));
    }

    pub fn download_changed(&self, delta: DownloadDelta) {
        self.send(ManagerEvent::Changed(delta));
    }

    pub fn surface_ready(&self, surface: SurfaceId) {
        self.send(ManagerEvent::SurfaceReady(surface));
    }

    /// Forwards a surface message if it decodes as an intent.
    pub fn handle_message(&self, message: &Value) -> bool {
        message_handler::handle_message(&self.events, message)
    }

    /// Mirrors an external options change into the store.
    ///
    /// The store publishes the keys that actually changed, which reach the
    /// manager through the forwarding task.
    pub fn options_changed(&self, change: &OptionsChange) -> Result<(), OptionsError> {
        let mut store = self
            .options_store
            .lock()
            .map_err(|_| OptionsError::IoError("options store lock poisoned".to_string()))?;
        let options = apply_change(store.get(), change)?;
        store.set(options)?;
        Ok(())
    }

    /// Stops the manager and returns its final state.
    pub async fn shutdown(self) -> Option<DownloadManager> {
        self.send(ManagerEvent::Shutdown);
        self.options_forwarder.abort();
        match self.manager.await {
            Ok(manager) => Some(manager),
            Err(e) => {
                tracing::warn!(error = %e, "download manager task failed");
                None
            }
        }
    }

    fn send(&self, event: ManagerEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("download manager is not running");
        }
    }
}
