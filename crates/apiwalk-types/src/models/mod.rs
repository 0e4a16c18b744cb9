//! Shared models for apiwalk.

mod config;
mod outcome;
mod verb;

pub use config::ClientConfig;
pub use outcome::{Outcome, ServerFailure};
pub use verb::Verb;
