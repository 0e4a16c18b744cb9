//! Typed error definitions for apiwalk.
//!
//! Resolution errors are raised before any network call and indicate a
//! mismatch between client navigation and the OpenAPI document. Server-side
//! failures are not errors at all; see [`crate::models::Outcome`].

mod resolve;
mod spec;
mod storage;

pub use resolve::ResolveError;
pub use spec::SpecError;
pub use storage::StorageError;
