//! # apiwalk Types
//!
//! Core types, outcomes, and error definitions for apiwalk.
//!
//! - **`error`** - Typed error hierarchy for resolution, documents, and storage
//! - **`models`** - Verbs, request outcomes, client configuration
//!
//! ## Architecture Role
//!
//! `apiwalk-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!      apiwalk-types (this crate)
//!              │
//!              ▼
//!       apiwalk-client
//! ```
//!
//! Errors and outcomes are serializable so that callers can forward them
//! over their own APIs unchanged.

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ResolveError, SpecError, StorageError};

// Re-export core model types
pub use models::{ClientConfig, Outcome, ServerFailure, Verb};
