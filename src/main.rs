//! Download status console demo.
//!
//! Drives the engine against the in-memory host: two downloads are created,
//! one is ignored by type, the other progresses, completes and is cleared.
//! Set `RUST_LOG=debug` to watch the manager's decisions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use download_status::app::{init_tracing, App};
use download_status::managers::download_record::DownloadRecord;
use download_status::platform::memory::{MemoryHost, RecordingSurface};
use download_status::services::options_store::{OptionsStore, OptionsStoreTrait};
use download_status::types::download::{Change, DownloadDelta, DownloadItem, DownloadState};
use download_status::types::message::SurfaceMessage;

const MIB: i64 = 1024 * 1024;

fn print_downloads(title: &str, message: Option<SurfaceMessage>) {
    println!("--- {} ---", title);
    let downloads = match message {
        Some(message) => message.downloads().to_vec(),
        None => Vec::new(),
    };
    if downloads.is_empty() {
        println!("  (no downloads)");
    }
    for serialized in downloads {
        let record = DownloadRecord::from_serialized(serialized);
        println!(
            "  #{} {:<16} {:<24} {:>10}/s  {}",
            record.id(),
            record.filename(),
            record.progress_text(),
            download_status::services::format::format_file_size(record.calculate_speed(10), true),
            record.status_text()
        );
    }
    println!();
}

#[tokio::main]
async fn main() {
    init_tracing();

    println!();
    println!("Download Status v{} (demo mode)", env!("CARGO_PKG_VERSION"));
    println!();

    let host = Arc::new(MemoryHost::new());
    let surface = Arc::new(RecordingSurface::new());

    let config_dir = std::env::temp_dir().join("download-status-demo");
    let mut store = OptionsStore::new(Some(
        config_dir.join("options.json").to_string_lossy().to_string(),
    ));
    if let Err(e) = store.reset() {
        eprintln!("could not reset demo options: {}", e);
    }
    for (key, value) in [
        ("refreshRate", serde_json::json!(200)),
        ("ignoredCustomTypes", serde_json::json!(["*.tmp"])),
        ("playSoundOnComplete", serde_json::json!(true)),
        ("playSoundDownloadDuration", serde_json::json!(0)),
    ] {
        if let Err(e) = store.set_value(key, value) {
            eprintln!("could not set {}: {}", key, e);
        }
    }

    let app = App::start(host.clone(), surface.clone(), store);

    let mut iso = DownloadItem::new(1, "https://example.com/linux.iso", "/downloads/linux.iso");
    iso.total_bytes = 40 * MIB;
    iso.mime = "application/x-iso9660-image".to_string();
    let scratch = DownloadItem::new(2, "https://example.com/scratch.tmp", "/downloads/scratch.tmp");

    for item in [iso.clone(), scratch.clone()] {
        host.insert(item.clone());
        app.download_created(item);
    }

    for step in 1..=8 {
        tokio::time::sleep(Duration::from_millis(250)).await;
        host.update(1, |item| {
            item.bytes_received = (step * 5 * MIB).min(item.total_bytes);
            item.estimated_end_time = Some(Utc::now() + chrono::Duration::seconds(8 - step));
        });
    }
    print_downloads("while downloading", surface.last_broadcast());

    host.update(1, |item| {
        item.state = DownloadState::Complete;
        item.file_size = item.total_bytes;
    });
    let mut delta = DownloadDelta::new(1);
    delta.state = Some(Change::to(DownloadState::Complete));
    delta.file_size = Some(Change::to(40 * MIB));
    app.download_changed(delta);

    tokio::time::sleep(Duration::from_millis(500)).await;
    print_downloads("after completion", surface.last_broadcast());
    println!("completion sounds played: {}", surface.sound_count());
    println!();

    app.handle_message(&serde_json::json!({ "event": "clearDownloads" }));
    tokio::time::sleep(Duration::from_millis(100)).await;
    print_downloads("after clearing", surface.last_broadcast());

    if let Some(manager) = app.shutdown().await {
        println!("tracked downloads at shutdown: {}", manager.tracked_ids().len());
    }
}
