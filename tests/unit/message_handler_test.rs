//! Unit tests for intent decoding and the App message entry points.

use std::sync::Arc;
use std::time::Duration;

use download_status::app::App;
use download_status::managers::download_manager::ManagerEvent;
use download_status::managers::download_record::DownloadRecord;
use download_status::message_handler::{decode_intent, decode_intent_str, handle_message};
use download_status::platform::memory::{MemoryHost, RecordingSurface};
use download_status::services::options_store::{OptionsStore, OptionsStoreTrait};
use download_status::types::download::DownloadItem;
use download_status::types::message::IntentEvent;
use download_status::types::options::OptionsChange;
use serde_json::{json, Value};
use tokio::sync::mpsc;

fn download_json(id: u64) -> Value {
    let item = DownloadItem::new(id, "https://example.com/file", "/downloads/file.bin");
    serde_json::to_value(DownloadRecord::new(item).to_serialized()).unwrap()
}

// === decode_intent ===

#[test]
fn test_decode_intents_without_payload() {
    assert_eq!(
        decode_intent(&json!({"event": "clearDownloads"})),
        Some(IntentEvent::ClearDownloads)
    );
    assert_eq!(
        decode_intent(&json!({"event": "openOptions"})),
        Some(IntentEvent::OpenOptions)
    );
}

#[test]
fn test_decode_download_intents() {
    for name in [
        "clearDownload",
        "openDownload",
        "showDownload",
        "cancelDownload",
        "pauseDownload",
        "resumeDownload",
        "deleteDownload",
    ] {
        let intent = decode_intent(&json!({"event": name, "download": download_json(7)}))
            .unwrap_or_else(|| panic!("{} did not decode", name));
        assert_eq!(intent.name(), name);
        assert_eq!(intent.download().unwrap().download_item.id, 7);
    }
}

#[test]
fn test_extra_fields_are_ignored() {
    let message = json!({"event": "clearDownloads", "sender": "tab-3"});
    assert_eq!(decode_intent(&message), Some(IntentEvent::ClearDownloads));
}

#[test]
fn test_unknown_event_is_dropped() {
    assert!(decode_intent(&json!({"event": "reticulateSplines"})).is_none());
}

#[test]
fn test_missing_or_non_string_event_is_dropped() {
    assert!(decode_intent(&json!({"download": download_json(1)})).is_none());
    assert!(decode_intent(&json!({"event": 3})).is_none());
    assert!(decode_intent(&json!("clearDownloads")).is_none());
}

#[test]
fn test_download_intent_without_payload_is_dropped() {
    assert!(decode_intent(&json!({"event": "pauseDownload"})).is_none());
    assert!(decode_intent(&json!({"event": "pauseDownload", "download": {"id": 1}})).is_none());
}

#[test]
fn test_decode_intent_str() {
    assert_eq!(
        decode_intent_str(r#"{"event":"openOptions"}"#),
        Some(IntentEvent::OpenOptions)
    );
    assert!(decode_intent_str("not json").is_none());
    assert!(decode_intent_str("").is_none());
}

// === handle_message ===

#[test]
fn test_handle_message_forwards_intents_only() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    assert!(handle_message(&tx, &json!({"event": "clearDownloads"})));
    assert!(!handle_message(&tx, &json!({"event": "bogus"})));

    match rx.try_recv() {
        Ok(ManagerEvent::Intent(IntentEvent::ClearDownloads)) => {}
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_handle_message_after_manager_stopped() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    assert!(!handle_message(&tx, &json!({"event": "clearDownloads"})));
}

// === App ===

fn start_app(dir: &tempfile::TempDir) -> (App, Arc<MemoryHost>, Arc<RecordingSurface>) {
    let path = dir.path().join("options.json").to_string_lossy().to_string();
    let mut store = OptionsStore::new(Some(path));
    store.load().unwrap();

    let host = Arc::new(MemoryHost::new());
    let surface = Arc::new(RecordingSurface::new());
    let app = App::start(host.clone(), surface.clone(), store);
    (app, host, surface)
}

#[tokio::test]
async fn test_app_routes_surface_messages_to_manager() {
    let dir = tempfile::tempdir().unwrap();
    let (app, host, _surface) = start_app(&dir);

    let item = DownloadItem::new(1, "https://example.com/file", "/downloads/file.bin");
    host.insert(item.clone());
    app.download_created(item);
    assert!(app.handle_message(&json!({"event": "pauseDownload", "download": download_json(1)})));
    assert!(!app.handle_message(&json!({"event": "noSuchEvent"})));

    let manager = app.shutdown().await.unwrap();
    assert_eq!(manager.tracked_ids(), vec![1]);
    assert!(manager.get(1).unwrap().item().paused);
    assert!(host.get(1).unwrap().paused);
}

#[tokio::test]
async fn test_app_mirrors_options_changes() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _host, _surface) = start_app(&dir);

    app.options_changed(&OptionsChange::single("clearHistory", json!(true)))
        .unwrap();
    assert!(app.options_store().lock().unwrap().get().clear_history);

    // Give the forwarding task a chance to deliver the change.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let manager = app.shutdown().await.unwrap();
    assert!(manager.options().clear_history);
}

#[tokio::test]
async fn test_app_rejects_bad_options_change() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _host, _surface) = start_app(&dir);

    let result = app.options_changed(&OptionsChange::single("refreshRate", json!("soon")));
    assert!(result.is_err());
    assert_eq!(app.options_store().lock().unwrap().get().refresh_rate, 1000);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_app_surface_ready_is_answered_directly() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _host, surface) = start_app(&dir);

    app.surface_ready(3);
    app.shutdown().await.unwrap();

    assert_eq!(surface.events().len(), 1);
    assert_eq!(surface.broadcast_count(), 0);
}
