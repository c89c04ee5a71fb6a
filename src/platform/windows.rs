// Download status config path for Windows
// Config: %APPDATA%/DownloadStatus

use std::env;
use std::path::PathBuf;

/// Returns the configuration directory on Windows.
/// `%APPDATA%/DownloadStatus`
pub fn get_config_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("DownloadStatus")
}
