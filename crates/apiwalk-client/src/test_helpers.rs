//! Shared fixtures for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::spec::Specification;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

pub(crate) fn chain(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn sample_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {"title": "Sample", "version": "1.0.0"},
        "paths": {
            "/auth/login": {"post": {"operationId": "login"}},
            "/users": {"get": {"operationId": "listUsers"}, "post": {"operationId": "createUser"}},
            "/users/{id}": {
                "get": {"operationId": "getUser"},
                "patch": {"operationId": "updateUser"},
                "put": {"operationId": "replaceUser"},
                "delete": {"operationId": "deleteUser"}
            }
        }
    })
}

#[allow(clippy::expect_used, reason = "fixture document is static")]
pub(crate) fn sample_spec() -> Specification {
    Specification::from_value(&sample_document()).expect("sample document is valid")
}

type Responder = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// Records every request and answers with a fixed responder.
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    respond: Responder,
}

impl RecordingTransport {
    /// Answers `{"ok":true}` with status 200.
    pub(crate) fn ok() -> Self {
        Self::responding(|_| HttpResponse::new(200, r#"{"ok":true}"#))
    }

    pub(crate) fn responding(
        respond: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Self {
        Self { requests: Mutex::new(Vec::new()), respond: Box::new(respond) }
    }

    pub(crate) fn last(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    pub(crate) fn count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = (self.respond)(&request);
        self.requests.lock().push(request);
        Ok(response)
    }
}
