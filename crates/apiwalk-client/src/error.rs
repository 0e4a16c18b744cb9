//! Error types for the apiwalk client.

use apiwalk_types::{ResolveError, SpecError};
use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur when using the client.
///
/// Non-2xx responses are not errors; they come back as
/// [`apiwalk_types::Outcome::ServerError`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// The navigation chain or verb does not match the OpenAPI document.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The OpenAPI document could not be turned into a path table.
    #[error("Invalid OpenAPI document: {0}")]
    Spec(#[from] SpecError),

    /// The HTTP exchange failed before a response was received.
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The default HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fetching the OpenAPI document returned a non-2xx status.
    #[error("Failed to fetch OpenAPI document from {url}: HTTP {status}")]
    Bootstrap {
        /// HTTP status code.
        status: u16,
        /// Document URL.
        url: String,
    },

    /// Server returned a non-empty body that is not JSON.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Payload could not be serialized to JSON.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Client configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Resolution failures are raised before any request is sent.
    pub fn is_resolution(&self) -> bool {
        matches!(self, ClientError::Resolve(_))
    }
}
