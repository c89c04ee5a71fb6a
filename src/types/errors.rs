use std::fmt;

use crate::types::download::DownloadId;

// === HostError ===

/// Errors returned by the host download subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// No download with the given ID is known to the host.
    NotFound(DownloadId),
    /// The host refused the requested operation.
    Rejected(String),
    /// The host could not be reached or replied with garbage.
    Transport(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::NotFound(id) => write!(f, "Download not found: {}", id),
            HostError::Rejected(msg) => write!(f, "Host rejected operation: {}", msg),
            HostError::Transport(msg) => write!(f, "Host transport error: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}

// === OptionsError ===

/// Errors related to loading, saving and updating options.
#[derive(Debug)]
pub enum OptionsError {
    /// File system I/O error.
    IoError(String),
    /// JSON serialization/deserialization error.
    SerializationError(String),
    /// The option key is unknown.
    InvalidKey(String),
    /// The value has the wrong type for its key.
    InvalidValue(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::IoError(msg) => write!(f, "Options I/O error: {}", msg),
            OptionsError::SerializationError(msg) => {
                write!(f, "Options serialization error: {}", msg)
            }
            OptionsError::InvalidKey(key) => write!(f, "Invalid options key: {}", key),
            OptionsError::InvalidValue(msg) => write!(f, "Invalid options value: {}", msg),
        }
    }
}

impl std::error::Error for OptionsError {}

// === BridgeError ===

/// Errors on the newline-delimited JSON bridge.
#[derive(Debug)]
pub enum BridgeError {
    /// Reading or writing the stream failed.
    Io(String),
    /// A frame could not be encoded or decoded.
    Protocol(String),
    /// The peer went away before replying.
    Closed,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Io(msg) => write!(f, "Bridge I/O error: {}", msg),
            BridgeError::Protocol(msg) => write!(f, "Bridge protocol error: {}", msg),
            BridgeError::Closed => write!(f, "Bridge closed"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<BridgeError> for HostError {
    fn from(err: BridgeError) -> Self {
        HostError::Transport(err.to_string())
    }
}
