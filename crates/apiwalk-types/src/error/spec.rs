//! OpenAPI document errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning a fetched document into a path table.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum SpecError {
    /// The document carries no `paths` object
    #[error("OpenAPI document has no `paths` object")]
    MissingPaths,

    /// A path entry is not an object
    #[error("Invalid path item {template}: {message}")]
    InvalidPathItem {
        /// Offending path template
        template: String,
        /// Description of the problem
        message: String,
    },

    /// The document body is not valid JSON
    #[error("OpenAPI document parse error: {message}")]
    Parse {
        /// Parser message
        message: String,
    },
}

impl SpecError {
    /// Create a parse error from a serde_json error.
    pub fn from_json_error(e: &serde_json::Error) -> Self {
        Self::Parse { message: e.to_string() }
    }
}
