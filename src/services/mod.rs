// Download status services
// Services hold stateless logic: file-type classification, filtering policy, formatting and options persistence.

pub mod file_type_classifier;
pub mod filter_policy;
pub mod format;
pub mod options_store;
