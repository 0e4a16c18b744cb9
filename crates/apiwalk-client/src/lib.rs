#![doc = include_str!("../README.md")]

mod cache;
mod client;
mod endpoint;
mod error;
mod executor;
mod matcher;
mod spec;
mod token;
mod transport;
mod url_builder;

#[cfg(test)]
mod test_helpers;

pub use cache::{CacheKey, Resource, ResourceCache, Shape};
pub use client::{derive_base_url, ApiClient, ApiClientBuilder};
pub use endpoint::{Endpoint, Request};
pub use error::ClientError;
pub use executor::Response;
pub use matcher::find_template;
pub use spec::{Operation, PathTemplate, Segment, Specification};
pub use token::{FileStorage, MemoryStorage, TokenStorage, TokenStore};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use url_builder::{build_query_string, build_url};

pub use apiwalk_types::{
    ClientConfig, Outcome, ResolveError, ServerFailure, SpecError, StorageError, Verb,
};
