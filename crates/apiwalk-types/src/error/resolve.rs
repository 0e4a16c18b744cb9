//! Endpoint resolution errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a navigation chain cannot be turned into a documented operation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ResolveError {
    /// No path template matches the chain
    #[error("No endpoint matches /{}", chain.join("/"))]
    UnresolvedEndpoint {
        /// Literal segments that were navigated
        chain: Vec<String>,
    },

    /// The matched template does not declare the requested verb
    #[error("Method {method} not supported on {template}")]
    UnsupportedMethod {
        /// Upper-case HTTP method name
        method: String,
        /// Matched path template, e.g. `/users/{id}`
        template: String,
    },
}
