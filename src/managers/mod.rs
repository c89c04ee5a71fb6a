// Download status state managers
// Managers handle stateful operations: download records, the reconciliation loop, polling and auto-hide timers.

pub mod autohide;
pub mod download_manager;
pub mod download_record;
pub mod polling;
