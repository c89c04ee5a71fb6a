//! Unit tests for the filtering policy: ignore rules, auto-hide rules and
//! which downloads survive "clear all".

use download_status::managers::download_record::DownloadRecord;
use download_status::services::file_type_classifier::lookup_by_name;
use download_status::services::filter_policy::{
    filter_active_only, should_auto_hide, should_ignore,
};
use download_status::types::download::{DownloadItem, DownloadState};
use download_status::types::options::SyncOptions;

fn download(id: u64, filename: &str, mime: &str) -> DownloadItem {
    let mut item = DownloadItem::new(id, "https://example.com/file", filename);
    item.mime = mime.to_string();
    item
}

fn with_state(id: u64, state: DownloadState, error: Option<&str>, paused: bool) -> DownloadRecord {
    let mut item = download(id, "/downloads/file.bin", "");
    item.state = state;
    item.error = error.map(|e| e.to_string());
    item.paused = paused;
    DownloadRecord::new(item)
}

// === shouldIgnore ===

#[test]
fn test_nothing_ignored_by_default() {
    let options = SyncOptions::default();
    assert!(!should_ignore(&download(1, "/d/a.png", "image/png"), &options));
}

#[test]
fn test_ignored_by_file_type() {
    let options = SyncOptions {
        ignored_file_types: vec![lookup_by_name("Torrent").unwrap().clone()],
        ..Default::default()
    };
    assert!(should_ignore(&download(1, "/d/linux.torrent", ""), &options));
    assert!(should_ignore(&download(2, "/d/x", "application/x-bittorrent"), &options));
    assert!(!should_ignore(&download(3, "/d/linux.iso", ""), &options));
}

#[test]
fn test_ignored_by_custom_type() {
    let options = SyncOptions {
        ignored_custom_types: vec!["*.part".to_string(), "text/csv".to_string()],
        ..Default::default()
    };
    assert!(should_ignore(&download(1, "/d/video.mp4.part", ""), &options));
    assert!(should_ignore(&download(2, "/d/data", "text/csv"), &options));
    assert!(!should_ignore(&download(3, "/d/video.mp4", "video/mp4"), &options));
}

#[test]
fn test_ignore_pattern_stays_in_its_directory() {
    let options = SyncOptions {
        ignored_custom_types: vec!["/downloads/*.iso".to_string()],
        ..Default::default()
    };
    assert!(should_ignore(&download(1, "/downloads/linux.iso", ""), &options));
    assert!(!should_ignore(&download(2, "/downloads/sub/linux.iso", ""), &options));
}

// === shouldAutoHide ===

#[test]
fn test_auto_hide_disabled() {
    let options = SyncOptions {
        autohide_enable: false,
        autohide_custom_types: vec!["png".to_string()],
        ..Default::default()
    };
    assert!(!should_auto_hide(&download(1, "/d/a.png", ""), &options));
}

#[test]
fn test_auto_hide_enabled_without_rules_hides_everything() {
    let options = SyncOptions {
        autohide_enable: true,
        ..Default::default()
    };
    assert!(should_auto_hide(&download(1, "/d/a.png", ""), &options));
    assert!(should_auto_hide(&download(2, "/d/unknown", ""), &options));
}

#[test]
fn test_auto_hide_matches_rules_only() {
    let options = SyncOptions {
        autohide_enable: true,
        autohide_file_types: vec![lookup_by_name("PNG").unwrap().clone()],
        autohide_custom_types: vec!["*.log".to_string()],
        ..Default::default()
    };
    assert!(should_auto_hide(&download(1, "/d/a.png", ""), &options));
    assert!(should_auto_hide(&download(2, "/d/build.log", ""), &options));
    assert!(!should_auto_hide(&download(3, "/d/a.zip", ""), &options));
}

// === filterActiveOnly ===

#[test]
fn test_filter_keeps_in_progress_and_paused() {
    let records = vec![
        with_state(1, DownloadState::InProgress, None, false),
        with_state(2, DownloadState::Complete, None, false),
        with_state(3, DownloadState::Interrupted, Some("NETWORK_FAILED"), true),
    ];

    let kept: Vec<u64> = filter_active_only(records, false).iter().map(|r| r.id()).collect();
    assert_eq!(kept, vec![1, 3]);
}

#[test]
fn test_filter_keeps_failed_unless_included() {
    let records = vec![
        with_state(1, DownloadState::Interrupted, Some("NETWORK_FAILED"), false),
        with_state(2, DownloadState::Interrupted, Some("USER_CANCELED"), false),
        with_state(3, DownloadState::Complete, None, false),
    ];

    let kept: Vec<u64> = filter_active_only(&records, false).iter().map(|r| r.id()).collect();
    assert_eq!(kept, vec![1]);

    let kept: Vec<u64> = filter_active_only(&records, true).iter().map(|r| r.id()).collect();
    assert!(kept.is_empty());
}

#[test]
fn test_filter_preserves_order() {
    let records: Vec<DownloadRecord> = (1..=5)
        .rev()
        .map(|id| with_state(id, DownloadState::InProgress, None, false))
        .collect();
    let kept: Vec<u64> = filter_active_only(records, true).iter().map(|r| r.id()).collect();
    assert_eq!(kept, vec![5, 4, 3, 2, 1]);
}
