use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host-assigned download identifier, unique per host session.
pub type DownloadId = u64;

/// Size reported by the host when the total is not known.
pub const UNKNOWN_SIZE: i64 = -1;

/// Lifecycle state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    InProgress,
    Interrupted,
    Complete,
}

impl DownloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::InProgress => "in_progress",
            DownloadState::Interrupted => "interrupted",
            DownloadState::Complete => "complete",
        }
    }
}

fn unknown_size() -> i64 {
    UNKNOWN_SIZE
}

fn default_true() -> bool {
    true
}

/// Snapshot of one download as reported by the host.
///
/// Records own their item exclusively and replace it wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItem {
    pub id: DownloadId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub mime: String,
    pub state: DownloadState,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub bytes_received: i64,
    #[serde(default = "unknown_size")]
    pub total_bytes: i64,
    #[serde(default = "unknown_size")]
    pub file_size: i64,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub can_resume: bool,
    #[serde(default = "default_true")]
    pub exists: bool,
    #[serde(default)]
    pub incognito: bool,
}

impl DownloadItem {
    /// Creates an in-progress item of unknown size that started now.
    pub fn new(id: DownloadId, url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            referrer: None,
            filename: filename.into(),
            mime: String::new(),
            state: DownloadState::InProgress,
            paused: false,
            error: None,
            bytes_received: 0,
            total_bytes: UNKNOWN_SIZE,
            file_size: UNKNOWN_SIZE,
            start_time: Utc::now(),
            end_time: None,
            estimated_end_time: None,
            can_resume: false,
            exists: true,
            incognito: false,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == DownloadState::InProgress
    }

    pub fn is_complete(&self) -> bool {
        self.state == DownloadState::Complete
    }

    pub fn has_error(&self) -> bool {
        self.error.as_deref().map_or(false, |e| !e.is_empty())
    }

    /// An unpaused interruption caused by the user cancelling or shutting down.
    pub fn is_cancelled(&self) -> bool {
        if self.paused {
            return false;
        }
        self.state == DownloadState::Interrupted
            && matches!(
                self.error.as_deref(),
                Some(CANCELED_BY_USER) | Some(CANCELED_BY_SHUTDOWN)
            )
    }
}

/// Interrupt reason reported when the user cancels a download.
pub const CANCELED_BY_USER: &str = "USER_CANCELED";
/// Interrupt reason reported when the browser shuts down mid-download.
pub const CANCELED_BY_SHUTDOWN: &str = "USER_SHUTDOWN";

/// A single changed field inside a [`DownloadDelta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change<T> {
    pub current: Option<T>,
    pub previous: Option<T>,
}

impl<T> Change<T> {
    pub fn to(current: T) -> Self {
        Self {
            current: Some(current),
            previous: None,
        }
    }
}

/// Partial change notification from the host. Only changed fields are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDelta {
    pub id: DownloadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Change<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<Change<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<Change<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Change<DownloadState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<Change<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Change<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<Change<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<Change<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<Change<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Change<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Change<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_end_time: Option<Change<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_resume: Option<Change<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<Change<bool>>,
}

fn fold<T: Clone>(target: &mut T, change: &Option<Change<T>>) {
    if let Some(current) = change.as_ref().and_then(|c| c.current.as_ref()) {
        *target = current.clone();
    }
}

fn fold_optional<T: Clone>(target: &mut Option<T>, change: &Option<Change<T>>) {
    if let Some(change) = change {
        *target = change.current.clone();
    }
}

impl DownloadDelta {
    pub fn new(id: DownloadId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// True when the delta moves the download into the `complete` state.
    pub fn signals_completion(&self) -> bool {
        matches!(
            self.state.as_ref().and_then(|c| c.current),
            Some(DownloadState::Complete)
        )
    }

    /// Folds every present field into `item`. The id is never touched.
    pub fn apply_to(&self, item: &mut DownloadItem) {
        fold(&mut item.url, &self.url);
        fold(&mut item.filename, &self.filename);
        fold(&mut item.mime, &self.mime);
        fold(&mut item.state, &self.state);
        fold(&mut item.paused, &self.paused);
        fold_optional(&mut item.error, &self.error);
        fold(&mut item.bytes_received, &self.bytes_received);
        fold(&mut item.total_bytes, &self.total_bytes);
        fold(&mut item.file_size, &self.file_size);
        fold(&mut item.start_time, &self.start_time);
        fold_optional(&mut item.end_time, &self.end_time);
        fold_optional(&mut item.estimated_end_time, &self.estimated_end_time);
        fold(&mut item.can_resume, &self.can_resume);
        fold(&mut item.exists, &self.exists);
    }
}

/// One observation of received bytes at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSample {
    pub time: DateTime<Utc>,
    pub bytes_received: i64,
}

impl ProgressSample {
    pub fn new(time: DateTime<Utc>, bytes_received: i64) -> Self {
        Self {
            time,
            bytes_received,
        }
    }
}

/// Transport-safe form of a download record, as exchanged with presentation surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDownload {
    pub download_item: DownloadItem,
    #[serde(default)]
    pub download_progress: Vec<ProgressSample>,
}
