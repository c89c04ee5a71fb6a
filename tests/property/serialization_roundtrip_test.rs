//! Property-based tests for the wire forms exchanged with presentation
//! surfaces and the options file.
//!
//! Timestamps are generated at whole seconds so they survive RFC 3339
//! text unchanged.

use chrono::{DateTime, TimeZone, Utc};
use download_status::managers::download_record::{DownloadRecord, PROGRESS_WINDOW};
use download_status::message_handler::decode_intent;
use download_status::types::download::{DownloadItem, DownloadState, ProgressSample};
use download_status::types::message::{IntentEvent, SurfaceMessage};
use download_status::types::options::SyncOptions;
use proptest::prelude::*;

fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn arb_state() -> impl Strategy<Value = DownloadState> {
    prop_oneof![
        Just(DownloadState::InProgress),
        Just(DownloadState::Interrupted),
        Just(DownloadState::Complete),
    ]
}

fn arb_item() -> impl Strategy<Value = DownloadItem> {
    (
        any::<u64>(),
        "[a-z]{1,12}",
        "(/[a-z0-9_]{1,8}){1,3}\\.[a-z]{2,4}",
        arb_state(),
        any::<bool>(),
        proptest::option::of("[A-Z_]{3,16}"),
        (0i64..1 << 40, -1i64..1 << 40),
        arb_time(),
        proptest::option::of(arb_time()),
    )
        .prop_map(
            |(id, host, filename, state, paused, error, (received, total), start, end)| {
                let mut item =
                    DownloadItem::new(id, format!("https://{}.example/file", host), filename);
                item.state = state;
                item.paused = paused;
                item.error = error;
                item.bytes_received = received;
                item.total_bytes = total;
                item.start_time = start;
                item.end_time = end;
                item
            },
        )
}

fn arb_record() -> impl Strategy<Value = DownloadRecord> {
    (
        arb_item(),
        prop::collection::vec((arb_time(), 0i64..1 << 40), 1..=PROGRESS_WINDOW),
    )
        .prop_map(|(item, samples)| {
            let mut serialized = DownloadRecord::new(item).to_serialized();
            serialized.download_progress = samples
                .into_iter()
                .map(|(time, bytes)| ProgressSample::new(time, bytes))
                .collect();
            DownloadRecord::from_serialized(serialized)
        })
}

// **Property: records survive the surface wire format**
//
// *For any* record, broadcasting it to a surface and reading the payload
// back yields an identical record.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_record_roundtrip(records in prop::collection::vec(arb_record(), 0..5)) {
        let message = SurfaceMessage::UpdateDownloads {
            downloads: records.iter().map(|r| r.to_serialized()).collect(),
        };
        let json = serde_json::to_string(&message).unwrap();
        let decoded: SurfaceMessage = serde_json::from_str(&json).unwrap();

        let rebuilt: Vec<DownloadRecord> = decoded
            .downloads()
            .iter()
            .cloned()
            .map(DownloadRecord::from_serialized)
            .collect();
        prop_assert_eq!(rebuilt, records);
    }
}

// **Property: intents echo the download they were built from**
//
// *For any* record, an intent carrying it decodes back to the same intent.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_intent_roundtrip(record in arb_record(), pick in 0usize..3) {
        let download = record.to_serialized();
        let intent = match pick {
            0 => IntentEvent::PauseDownload { download },
            1 => IntentEvent::ClearDownload { download },
            _ => IntentEvent::DeleteDownload { download },
        };

        let value = serde_json::to_value(&intent).unwrap();
        prop_assert_eq!(decode_intent(&value), Some(intent));
    }
}

// **Property: options survive the options file**
//
// *For any* combination of scalar options, writing them as JSON and reading
// them back yields the same options.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_options_roundtrip(
        flags in prop::collection::vec(any::<bool>(), 9),
        autohide_duration in 0u64..3600,
        refresh_rate in 100u64..10_000,
        custom in prop::collection::vec("\\*\\.[a-z]{1,4}", 0..4),
    ) {
        let options = SyncOptions {
            always_show: flags[0],
            show_info_text: flags[1],
            autohide_enable: flags[2],
            play_sound_on_complete: flags[3],
            minimized: flags[4],
            clear_history: flags[5],
            clear_failed: flags[6],
            clear_after_opening: flags[7],
            theme: if flags[8] { "dark".to_string() } else { "light".to_string() },
            autohide_duration,
            refresh_rate,
            ignored_custom_types: custom,
            ..Default::default()
        };

        let json = serde_json::to_string(&options).unwrap();
        let decoded: SyncOptions = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, options);
    }
}
