//! Property-based tests for download speed estimation.
//!
//! Speed is derived from the most recent progress samples only, is never
//! negative, and agrees with a straightforward recomputation over the
//! retained window.

use chrono::{DateTime, Duration, TimeZone, Utc};
use download_status::managers::download_record::{DownloadRecord, PROGRESS_WINDOW};
use download_status::types::download::DownloadItem;
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Strategy for a sequence of (seconds elapsed, bytes gained) polling steps.
fn arb_steps() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..30, 0i64..1_000_000), 1..30)
}

fn record_from(steps: &[(i64, i64)]) -> DownloadRecord {
    let mut item = DownloadItem::new(1, "https://example.com/file", "/downloads/file.bin");
    item.start_time = start();
    let mut record = DownloadRecord::new(item);

    let mut time = start();
    let mut bytes = 0;
    for (secs, gained) in steps {
        time = time + Duration::seconds(*secs);
        bytes += gained;
        let mut next = record.item().clone();
        next.bytes_received = bytes;
        record.update(next, time);
    }
    record
}

// **Property: speed matches the retained window**
//
// *For any* monotone polling history, the speed over `n` samples equals the
// byte growth across the last `n` retained samples divided by their elapsed
// whole seconds (at least one).
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_speed_matches_window(steps in arb_steps(), sample_size in 1usize..=PROGRESS_WINDOW) {
        let record = record_from(&steps);
        let samples: Vec<_> = record.progress().iter().copied().collect();
        let window = &samples[samples.len().saturating_sub(sample_size)..];

        let first = window[0];
        let last = window[window.len() - 1];
        let seconds = (last.time - first.time).num_seconds().max(1);
        let bytes = last.bytes_received - first.bytes_received;
        let expected = if bytes <= 0 {
            0
        } else {
            (bytes as f64 / seconds as f64).round() as i64
        };

        prop_assert_eq!(record.calculate_speed(sample_size), expected);
    }
}

// **Property: speed is never negative**
//
// *For any* byte history, including regressions reported by the host,
// the estimated speed is zero or positive.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_speed_never_negative(
        bytes in prop::collection::vec(0i64..10_000_000, 1..25),
        sample_size in 0usize..=PROGRESS_WINDOW + 5,
    ) {
        let mut item = DownloadItem::new(1, "https://example.com/file", "/downloads/file.bin");
        item.start_time = start();
        let mut record = DownloadRecord::new(item);

        for (i, received) in bytes.iter().enumerate() {
            let mut next = record.item().clone();
            next.bytes_received = *received;
            record.update(next, start() + Duration::seconds(i as i64 + 1));
        }

        prop_assert!(record.calculate_speed(sample_size) >= 0);
    }
}

// **Property: a constant rate is measured exactly**
//
// *For any* steady rate sampled once per second, the speed equals that rate.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_constant_rate_is_exact(rate in 1i64..5_000_000, polls in 1usize..25) {
        let steps = vec![(1, rate); polls];
        let record = record_from(&steps);
        prop_assert_eq!(record.calculate_speed(PROGRESS_WINDOW), rate);
    }
}
