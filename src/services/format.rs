// Download status text formatting
// Human-readable file sizes and relative durations for progress and status text.

use chrono::Duration;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count using binary units, e.g. `1.5KB`, `20MB`.
///
/// Values are rounded to two decimals, or to a whole number when `round` is set.
/// Non-positive sizes format as `0B`.
pub fn format_file_size(bytes: i64, round: bool) -> String {
    if bytes <= 0 {
        return "0B".to_string();
    }

    let mut exponent = 0;
    let mut scale: i64 = 1;
    while exponent < SIZE_UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        exponent += 1;
    }

    let mut size = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    if round {
        size = size.round();
    }

    format!("{}{}", size, SIZE_UNITS[exponent])
}

/// Describes a duration in relative words, e.g. `a few seconds`, `3 hours`.
///
/// The sign is ignored; an overdue estimate reads the same as a pending one.
pub fn humanize_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().unsigned_abs() as f64;

    let seconds = (millis / 1000.0).round();
    let minutes = (millis / 60_000.0).round();
    let hours = (millis / 3_600_000.0).round();
    let days = (millis / 86_400_000.0).round();
    let months = (millis / 86_400_000.0 * 4800.0 / 146_097.0).round();
    let years = (millis / 86_400_000.0 * 400.0 / 146_097.0).round();

    if seconds < 45.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{} months", months)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    }
}
