use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::file_type::FileType;

/// Lower bound for the polling period, in milliseconds.
pub const MIN_REFRESH_RATE_MS: u64 = 100;

/// Upper bound for the polling period, in milliseconds (one day).
pub const MAX_REFRESH_RATE_MS: u64 = 24 * 60 * 60 * 1000;

/// User options shared with the presentation layer.
///
/// Missing keys deserialize to their defaults, so a partially stored
/// snapshot always yields a complete set of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncOptions {
    pub theme: String,
    pub always_show: bool,
    pub show_info_text: bool,
    pub autohide_enable: bool,
    /// Seconds before a completed download is hidden.
    pub autohide_duration: u64,
    pub autohide_file_types: Vec<FileType>,
    pub autohide_custom_types: Vec<String>,
    pub ignored_file_types: Vec<FileType>,
    pub ignored_custom_types: Vec<String>,
    pub play_sound_on_complete: bool,
    /// Minimum download duration in seconds before the completion sound plays.
    pub play_sound_download_duration: u64,
    pub minimized: bool,
    /// Polling period in milliseconds.
    pub refresh_rate: u64,
    pub clear_history: bool,
    pub clear_failed: bool,
    pub clear_after_opening: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            always_show: false,
            show_info_text: true,
            autohide_enable: false,
            autohide_duration: 5,
            autohide_file_types: Vec::new(),
            autohide_custom_types: Vec::new(),
            ignored_file_types: Vec::new(),
            ignored_custom_types: Vec::new(),
            play_sound_on_complete: false,
            play_sound_download_duration: 2,
            minimized: false,
            refresh_rate: 1000,
            clear_history: false,
            clear_failed: false,
            clear_after_opening: false,
        }
    }
}

impl SyncOptions {
    pub fn autohide_delay(&self) -> Duration {
        Duration::from_secs(self.autohide_duration)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_rate.clamp(MIN_REFRESH_RATE_MS, MAX_REFRESH_RATE_MS))
    }

    pub fn sound_threshold(&self) -> Duration {
        Duration::from_secs(self.play_sound_download_duration)
    }
}

/// New value of a single option key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    #[serde(default)]
    pub new_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
}

/// Change notification for options, keyed by camelCase option name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsChange {
    pub changes: BTreeMap<String, ValueChange>,
}

impl OptionsChange {
    pub fn single(key: &str, new_value: Value) -> Self {
        let mut changes = BTreeMap::new();
        changes.insert(
            key.to_string(),
            ValueChange {
                new_value: Some(new_value),
                old_value: None,
            },
        );
        Self { changes }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
