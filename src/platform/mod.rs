// Download status platform abstraction
// Provides platform-specific config paths and the capability surface of the
// host browser: its download subsystem and the presentation surfaces (tabs).
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific config path at compile time.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::download::{DownloadId, DownloadItem, DownloadState};
use crate::types::errors::HostError;
use crate::types::message::{SurfaceId, SurfaceMessage};

#[cfg(feature = "bridge")]
pub mod bridge;
pub mod memory;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/download-status` (or `$XDG_CONFIG_HOME/download-status`)
/// - **macOS**: `~/Library/Application Support/DownloadStatus`
/// - **Windows**: `%APPDATA%/DownloadStatus`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Selects host history entries to erase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraseQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DownloadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DownloadState>,
}

impl EraseQuery {
    pub fn by_id(id: DownloadId) -> Self {
        Self {
            id: Some(id),
            state: None,
        }
    }

    pub fn by_state(state: DownloadState) -> Self {
        Self {
            id: None,
            state: Some(state),
        }
    }

    pub fn matches(&self, item: &DownloadItem) -> bool {
        self.id.map_or(true, |id| id == item.id) && self.state.map_or(true, |s| s == item.state)
    }
}

/// The host browser's download subsystem.
///
/// Downloads are executed by the host; this crate only queries and steers them.
#[async_trait]
pub trait DownloadHost: Send + Sync {
    /// Fetches the current snapshot of a download.
    async fn search(&self, id: DownloadId) -> Result<DownloadItem, HostError>;
    async fn pause(&self, id: DownloadId) -> Result<(), HostError>;
    async fn resume(&self, id: DownloadId) -> Result<(), HostError>;
    async fn cancel(&self, id: DownloadId) -> Result<(), HostError>;
    /// Deletes the downloaded file from disk.
    async fn remove_file(&self, id: DownloadId) -> Result<(), HostError>;
    /// Erases matching entries from the host's download history.
    async fn erase(&self, query: EraseQuery) -> Result<Vec<DownloadId>, HostError>;
    async fn open(&self, id: DownloadId) -> Result<(), HostError>;
    /// Reveals the file in the system file manager.
    async fn show(&self, id: DownloadId) -> Result<(), HostError>;
    async fn open_options_page(&self) -> Result<(), HostError>;
}

/// Presentation surfaces (tabs) that render the download list.
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    /// Sends a message to every interested surface.
    async fn broadcast(&self, message: &SurfaceMessage) -> Result<(), HostError>;
    /// Sends a message to one surface.
    async fn send_to(&self, surface: SurfaceId, message: &SurfaceMessage) -> Result<(), HostError>;
    async fn play_completion_sound(&self) -> Result<(), HostError>;
}
