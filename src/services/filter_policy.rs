// Download status filtering policy
// Decides which downloads are never tracked, which are hidden after completion,
// and which survive a "clear all".

use crate::services::file_type_classifier::{matches_custom_types, matches_file_types};
use crate::types::download::DownloadItem;
use crate::types::options::SyncOptions;

/// True if the download matches any ignored file type or custom type.
pub fn should_ignore(item: &DownloadItem, options: &SyncOptions) -> bool {
    matches_file_types(item, &options.ignored_file_types)
        || matches_custom_types(item, &options.ignored_custom_types)
}

/// True if the download should be removed after the auto-hide delay.
///
/// With auto-hide enabled and both type lists empty, every download is hidden.
pub fn should_auto_hide(item: &DownloadItem, options: &SyncOptions) -> bool {
    if !options.autohide_enable {
        return false;
    }

    if matches_file_types(item, &options.autohide_file_types)
        || matches_custom_types(item, &options.autohide_custom_types)
    {
        return true;
    }

    options.autohide_file_types.is_empty() && options.autohide_custom_types.is_empty()
}

/// True if the download stays visible after the user clears finished downloads.
///
/// In-progress and paused downloads always stay. A failed download stays
/// until it is cleared with `include_failed` set. Cancelled downloads never stay.
pub fn is_retained(item: &DownloadItem, include_failed: bool) -> bool {
    if item.is_in_progress() || item.paused {
        return true;
    }
    item.has_error() && !item.is_cancelled() && !include_failed
}

/// Keeps only the records that survive clearing, preserving order.
pub fn filter_active_only<T, I>(records: I, include_failed: bool) -> Vec<T>
where
    T: AsRef<DownloadItem>,
    I: IntoIterator<Item = T>,
{
    records
        .into_iter()
        .filter(|record| is_retained(record.as_ref(), include_failed))
        .collect()
}
