// Download status config path for Linux
// Config: ~/.config/download-status

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "download-status";

/// Returns the configuration directory on Linux.
/// Uses `$XDG_CONFIG_HOME/download-status` if set, otherwise `~/.config/download-status`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home).join(".config").join(APP_DIR)
        }
    }
}
