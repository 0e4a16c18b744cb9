//! Credential storage errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a token storage backend.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("Storage I/O error for {key}: {message}")]
    Io {
        /// Storage key being accessed
        key: String,
        /// Description of the I/O failure
        message: String,
    },

    /// The storage key cannot be used by this backend
    #[error("Invalid storage key {key:?}")]
    InvalidKey {
        /// Rejected key
        key: String,
    },
}

impl StorageError {
    /// Create an I/O error from a std::io error.
    pub fn from_io_error(key: &str, e: &std::io::Error) -> Self {
        Self::Io { key: key.to_string(), message: e.to_string() }
    }
}
