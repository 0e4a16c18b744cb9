//! Branchable request outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::verb::Verb;

/// A non-2xx response, reported as data rather than as an error.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[error("{method} {path} failed with status {status}")]
pub struct ServerFailure {
    /// HTTP status code
    pub status: u16,
    /// Parsed error body (`null` when the body was empty)
    pub error: Value,
    /// Matched path template
    pub path: String,
    /// Verb that was invoked
    pub method: Verb,
}

/// Result of a request that reached the server.
///
/// Resolution and transport problems are returned as `Err` by the client;
/// an `Outcome` only distinguishes what the server answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// 2xx response
    Success(T),
    /// Non-2xx response
    ServerError(ServerFailure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Outcome::ServerError(_))
    }

    /// The success value, if any.
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::ServerError(_) => None,
        }
    }

    /// The server failure, if any.
    pub fn failure(&self) -> Option<&ServerFailure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::ServerError(failure) => Some(failure),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::ServerError(failure) => Outcome::ServerError(failure),
        }
    }

    /// Converts into a `Result` for callers that prefer `?` propagation.
    pub fn into_result(self) -> Result<T, ServerFailure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::ServerError(failure) => Err(failure),
        }
    }
}
