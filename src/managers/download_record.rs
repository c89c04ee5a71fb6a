//! Download Record.
//!
//! Wraps one host-reported download together with a rolling window of
//! progress samples, and derives speed, percentage and display text from them.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::platform::DownloadHost;
use crate::services::file_type_classifier::{base_name, file_extension};
use crate::services::format::{format_file_size, humanize_duration};
use crate::types::download::{
    DownloadDelta, DownloadId, DownloadItem, DownloadState, ProgressSample, SerializedDownload,
    UNKNOWN_SIZE,
};
use crate::types::errors::HostError;

/// Maximum number of progress samples retained per record.
pub const PROGRESS_WINDOW: usize = 10;

/// Extensions treated as images when the MIME type is not conclusive.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["gif", "png", "jpg", "jpeg", "bmp", "webp"];

/// A tracked download and its recent progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRecord {
    item: DownloadItem,
    progress: VecDeque<ProgressSample>,
}

impl DownloadRecord {
    /// Creates a record seeded with one sample at the item's start time.
    pub fn new(item: DownloadItem) -> Self {
        let mut progress = VecDeque::with_capacity(PROGRESS_WINDOW + 1);
        progress.push_back(ProgressSample::new(item.start_time, item.bytes_received));
        Self { item, progress }
    }

    pub fn id(&self) -> DownloadId {
        self.item.id
    }

    pub fn item(&self) -> &DownloadItem {
        &self.item
    }

    /// Samples in chronological order, oldest first.
    pub fn progress(&self) -> &VecDeque<ProgressSample> {
        &self.progress
    }

    /// Replaces the wrapped item and samples its byte count at `time`.
    ///
    /// Completed items are not sampled; their final sample is recorded once
    /// through [`DownloadRecord::complete`].
    pub fn update(&mut self, item: DownloadItem, time: DateTime<Utc>) {
        let complete = item.state == DownloadState::Complete;
        let bytes_received = item.bytes_received;
        self.item = item;

        if !complete {
            self.push_sample(ProgressSample::new(time, bytes_received));
        }
        self.trim();
    }

    /// Records the final sample of a completed download using its file size.
    pub fn complete(&mut self, time: DateTime<Utc>) {
        let bytes = if self.item.file_size >= 0 {
            self.item.file_size
        } else {
            self.item.bytes_received
        };
        self.push_sample(ProgressSample::new(time, bytes));
        self.trim();
    }

    /// Folds a partial change into the wrapped item without sampling.
    pub fn apply_delta(&mut self, delta: &DownloadDelta) {
        delta.apply_to(&mut self.item);
    }

    fn push_sample(&mut self, sample: ProgressSample) {
        self.progress.push_back(sample);
    }

    fn trim(&mut self) {
        while self.progress.len() > PROGRESS_WINDOW {
            self.progress.pop_front();
        }
    }

    /// Average speed in bytes per second over the most recent `sample_size` samples.
    ///
    /// Elapsed time is counted in whole seconds with a floor of one second.
    /// Regressed or flat byte counts yield 0.
    pub fn calculate_speed(&self, sample_size: usize) -> i64 {
        let skip = self.progress.len().saturating_sub(sample_size);
        let mut window = self.progress.iter().skip(skip);

        let first = match window.next() {
            Some(sample) => sample,
            None => return 0,
        };
        let last = window.last().unwrap_or(first);

        let total_time = (last.time - first.time).num_seconds().max(1);
        let total_bytes = last.bytes_received - first.bytes_received;

        if total_bytes <= 0 {
            return 0;
        }

        (total_bytes as f64 / total_time as f64).round() as i64
    }

    /// File name without its directory; empty if the path has no separator.
    pub fn filename(&self) -> &str {
        let path = self.item.filename.as_str();
        if path.contains(|c| c == '/' || c == '\\') {
            base_name(path)
        } else {
            ""
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.item.is_cancelled()
    }

    /// True for `image/*` MIME types or a known image extension.
    ///
    /// The first entry of [`IMAGE_EXTENSIONS`] is never matched by extension,
    /// so a `.gif` without an image MIME type is not an image.
    pub fn is_image(&self) -> bool {
        if self.item.mime.starts_with("image/") {
            return true;
        }

        match file_extension(&self.item.filename) {
            Some(ext) => IMAGE_EXTENSIONS
                .iter()
                .position(|known| *known == ext)
                .map_or(false, |index| index > 0),
            None => false,
        }
    }

    /// Whole percent downloaded, 0 to 100.
    pub fn percent_downloaded(&self) -> u8 {
        if self.item.is_complete() {
            return 100;
        }
        if self.item.total_bytes <= 0 || self.item.bytes_received <= 0 {
            return 0;
        }

        let percent =
            i128::from(self.item.bytes_received) * 100 / i128::from(self.item.total_bytes);
        percent.clamp(0, 100) as u8
    }

    pub fn progress_text(&self) -> String {
        if self.item.is_complete() {
            return format_file_size(self.item.file_size, false);
        }

        let downloaded = format_file_size(self.item.bytes_received, false);
        if self.item.total_bytes == UNKNOWN_SIZE {
            return format!("{} / Unknown", downloaded);
        }

        format!(
            "{} / {} - {}%",
            downloaded,
            format_file_size(self.item.total_bytes, false),
            self.percent_downloaded()
        )
    }

    pub fn status_text(&self) -> String {
        self.status_text_at(Utc::now())
    }

    /// Status text with the remaining time measured from `now`.
    pub fn status_text_at(&self, now: DateTime<Utc>) -> String {
        if self.item.is_complete() {
            return "Complete".to_string();
        }
        if self.item.paused {
            return "Paused".to_string();
        }
        if self.is_cancelled() {
            return "Cancelled".to_string();
        }
        if let Some(error) = self.item.error.as_deref().filter(|e| !e.is_empty()) {
            return format!("Error: {}", error);
        }

        match self.item.estimated_end_time {
            Some(end) if self.item.total_bytes != UNKNOWN_SIZE => humanize_duration(end - now),
            _ => "In Progress".to_string(),
        }
    }

    pub async fn pause(&self, host: &dyn DownloadHost) -> Result<(), HostError> {
        host.pause(self.item.id).await
    }

    pub async fn resume(&self, host: &dyn DownloadHost) -> Result<(), HostError> {
        host.resume(self.item.id).await
    }

    pub fn to_serialized(&self) -> SerializedDownload {
        SerializedDownload {
            download_item: self.item.clone(),
            download_progress: self.progress.iter().copied().collect(),
        }
    }

    /// Rebuilds a record from its wire form.
    ///
    /// A payload without samples is reseeded from the item's start time.
    pub fn from_serialized(serialized: SerializedDownload) -> Self {
        if serialized.download_progress.is_empty() {
            return Self::new(serialized.download_item);
        }

        let mut record = Self {
            item: serialized.download_item,
            progress: serialized.download_progress.into_iter().collect(),
        };
        record.trim();
        record
    }
}

impl AsRef<DownloadItem> for DownloadRecord {
    fn as_ref(&self) -> &DownloadItem {
        &self.item
    }
}

impl From<&DownloadRecord> for SerializedDownload {
    fn from(record: &DownloadRecord) -> Self {
        record.to_serialized()
    }
}
