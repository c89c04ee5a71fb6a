// Download status options store
// Persists SyncOptions as a JSON file at the platform config path and
// notifies subscribers of every change.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::platform;
use crate::services::file_type_classifier::lookup_by_name;
use crate::types::errors::OptionsError;
use crate::types::file_type::FileType;
use crate::types::options::{OptionsChange, SyncOptions, ValueChange};

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Trait defining the options store interface.
pub trait OptionsStoreTrait {
    fn load(&mut self) -> Result<SyncOptions, OptionsError>;
    fn save(&self) -> Result<(), OptionsError>;
    fn get(&self) -> &SyncOptions;
    fn set(&mut self, options: SyncOptions) -> Result<OptionsChange, OptionsError>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<OptionsChange, OptionsError>;
    fn reset(&mut self) -> Result<OptionsChange, OptionsError>;
    fn subscribe(&self) -> broadcast::Receiver<OptionsChange>;
    fn get_config_path(&self) -> &str;
}

/// Options store backed by a JSON file on disk.
pub struct OptionsStore {
    config_path: String,
    options: SyncOptions,
    changes: broadcast::Sender<OptionsChange>,
}

impl OptionsStore {
    /// Creates a new OptionsStore.
    ///
    /// If `path_override` is `Some`, uses that path for the options file.
    /// Otherwise, uses `options.json` in the platform-specific config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("options.json")
                .to_string_lossy()
                .to_string(),
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            config_path,
            options: SyncOptions::default(),
            changes,
        }
    }

    fn commit(&mut self, options: SyncOptions) -> Result<OptionsChange, OptionsError> {
        let change = diff(&self.options, &options)?;
        self.options = options;
        self.save()?;
        self.publish(&change);
        Ok(change)
    }

    fn publish(&self, change: &OptionsChange) {
        if change.is_empty() {
            return;
        }
        // No receivers is not an error.
        let _ = self.changes.send(change.clone());
    }
}

impl OptionsStoreTrait for OptionsStore {
    /// Loads options from the JSON file.
    ///
    /// A missing file yields defaults. Missing keys take their defaults and
    /// stored file types are re-resolved against the catalog by name.
    fn load(&mut self) -> Result<SyncOptions, OptionsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.options = SyncOptions::default();
            return Ok(self.options.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| OptionsError::IoError(format!("Failed to read options file: {}", e)))?;

        let options: SyncOptions = serde_json::from_str(&content).map_err(|e| {
            OptionsError::SerializationError(format!("Failed to parse options file: {}", e))
        })?;

        self.options = resolve_file_types(options);
        Ok(self.options.clone())
    }

    /// Saves the current options, creating parent directories as needed.
    fn save(&self) -> Result<(), OptionsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                OptionsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.options).map_err(|e| {
            OptionsError::SerializationError(format!("Failed to serialize options: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| OptionsError::IoError(format!("Failed to write options file: {}", e)))?;

        Ok(())
    }

    fn get(&self) -> &SyncOptions {
        &self.options
    }

    /// Replaces all options, saves, and notifies subscribers of the keys that changed.
    fn set(&mut self, options: SyncOptions) -> Result<OptionsChange, OptionsError> {
        self.commit(resolve_file_types(options))
    }

    /// Updates a single option by its camelCase key, e.g. `"refreshRate"`.
    fn set_value(&mut self, key: &str, value: Value) -> Result<OptionsChange, OptionsError> {
        if key.is_empty() {
            return Err(OptionsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut object = to_object(&self.options)?;
        if !object.contains_key(key) {
            return Err(OptionsError::InvalidKey(format!(
                "Key '{}' not found in options",
                key
            )));
        }
        object.insert(key.to_string(), value);

        let options: SyncOptions = serde_json::from_value(Value::Object(object)).map_err(|e| {
            OptionsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.commit(resolve_file_types(options))
    }

    /// Restores defaults, saves, and notifies subscribers.
    fn reset(&mut self) -> Result<OptionsChange, OptionsError> {
        self.commit(SyncOptions::default())
    }

    fn subscribe(&self) -> broadcast::Receiver<OptionsChange> {
        self.changes.subscribe()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

/// Folds a change set into a copy of `options`.
///
/// Unknown keys are skipped; a value of the wrong type fails the whole change.
pub fn apply_change(options: &SyncOptions, change: &OptionsChange) -> Result<SyncOptions, OptionsError> {
    let mut object = to_object(options)?;

    for (key, value_change) in &change.changes {
        if !object.contains_key(key) {
            tracing::debug!(key = %key, "ignoring change to unknown option");
            continue;
        }
        if let Some(new_value) = &value_change.new_value {
            object.insert(key.clone(), new_value.clone());
        }
    }

    let options: SyncOptions = serde_json::from_value(Value::Object(object))
        .map_err(|e| OptionsError::InvalidValue(format!("Invalid options change: {}", e)))?;

    Ok(resolve_file_types(options))
}

/// Replaces stored file types with the catalog entry of the same name, if any.
pub fn resolve_file_types(mut options: SyncOptions) -> SyncOptions {
    options.autohide_file_types = resolve(options.autohide_file_types);
    options.ignored_file_types = resolve(options.ignored_file_types);
    options
}

fn resolve(file_types: Vec<FileType>) -> Vec<FileType> {
    file_types
        .into_iter()
        .map(|ft| lookup_by_name(&ft.name).cloned().unwrap_or(ft))
        .collect()
}

fn to_object(options: &SyncOptions) -> Result<Map<String, Value>, OptionsError> {
    match serde_json::to_value(options) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(OptionsError::SerializationError(
            "Options did not serialize to an object".to_string(),
        )),
        Err(e) => Err(OptionsError::SerializationError(format!(
            "Failed to serialize options: {}",
            e
        ))),
    }
}

fn diff(old: &SyncOptions, new: &SyncOptions) -> Result<OptionsChange, OptionsError> {
    let old = to_object(old)?;
    let new = to_object(new)?;
    let mut change = OptionsChange::default();

    for (key, new_value) in new {
        let old_value = old.get(&key).cloned();
        if old_value.as_ref() != Some(&new_value) {
            change.changes.insert(
                key,
                ValueChange {
                    new_value: Some(new_value),
                    old_value,
                },
            );
        }
    }

    Ok(change)
}
