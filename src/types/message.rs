use serde::{Deserialize, Serialize};

use crate::types::download::SerializedDownload;

/// Identifier of a presentation surface (a browser tab).
pub type SurfaceId = u64;

/// User intent sent by a presentation surface.
///
/// Decoded at the boundary from `{"event": "...", "download": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum IntentEvent {
    ClearDownloads,
    ClearDownload { download: SerializedDownload },
    OpenDownload { download: SerializedDownload },
    ShowDownload { download: SerializedDownload },
    CancelDownload { download: SerializedDownload },
    PauseDownload { download: SerializedDownload },
    ResumeDownload { download: SerializedDownload },
    DeleteDownload { download: SerializedDownload },
    OpenOptions,
}

impl IntentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            IntentEvent::ClearDownloads => "clearDownloads",
            IntentEvent::ClearDownload { .. } => "clearDownload",
            IntentEvent::OpenDownload { .. } => "openDownload",
            IntentEvent::ShowDownload { .. } => "showDownload",
            IntentEvent::CancelDownload { .. } => "cancelDownload",
            IntentEvent::PauseDownload { .. } => "pauseDownload",
            IntentEvent::ResumeDownload { .. } => "resumeDownload",
            IntentEvent::DeleteDownload { .. } => "deleteDownload",
            IntentEvent::OpenOptions => "openOptions",
        }
    }

    /// The download payload, for intents that target a single download.
    pub fn download(&self) -> Option<&SerializedDownload> {
        match self {
            IntentEvent::ClearDownload { download }
            | IntentEvent::OpenDownload { download }
            | IntentEvent::ShowDownload { download }
            | IntentEvent::CancelDownload { download }
            | IntentEvent::PauseDownload { download }
            | IntentEvent::ResumeDownload { download }
            | IntentEvent::DeleteDownload { download } => Some(download),
            IntentEvent::ClearDownloads | IntentEvent::OpenOptions => None,
        }
    }
}

/// Message pushed to presentation surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SurfaceMessage {
    UpdateDownloads { downloads: Vec<SerializedDownload> },
}

impl SurfaceMessage {
    pub fn downloads(&self) -> &[SerializedDownload] {
        match self {
            SurfaceMessage::UpdateDownloads { downloads } => downloads,
        }
    }
}
