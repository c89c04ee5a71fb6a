//! Download status: the tracking and lifecycle engine behind a browser
//! download status bar.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod managers;
pub mod message_handler;
pub mod platform;
pub mod services;
pub mod types;
