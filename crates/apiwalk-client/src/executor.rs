//! Turns one navigation chain + verb + payload into an HTTP exchange.

use apiwalk_types::{Outcome, ResolveError, ServerFailure, Verb};
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheKey, Resource, ResourceCache};
use crate::error::ClientError;
use crate::matcher::find_template;
use crate::spec::Specification;
use crate::token::TokenStore;
use crate::transport::{HttpRequest, Transport};
use crate::url_builder::{build_query_string, build_url};

/// Successful result of a call made with an arbitrary verb.
#[derive(Debug, Clone)]
pub enum Response {
    /// Cached, identity-stable result of a `get`
    Resource(Resource),
    /// Uncached body of any other verb
    Data(Value),
}

impl Response {
    /// Current JSON contents, whichever variant this is.
    pub fn to_value(&self) -> Value {
        match self {
            Response::Resource(resource) => resource.snapshot(),
            Response::Data(value) => value.clone(),
        }
    }

    pub fn into_resource(self) -> Option<Resource> {
        match self {
            Response::Resource(resource) => Some(resource),
            Response::Data(_) => None,
        }
    }

    pub fn into_data(self) -> Option<Value> {
        match self {
            Response::Resource(_) => None,
            Response::Data(value) => Some(value),
        }
    }
}

/// Body of a 2xx response plus the template it was matched against.
struct Delivered {
    template: String,
    data: Value,
}

pub(crate) struct Executor {
    spec: Arc<Specification>,
    base_url: String,
    cache: ResourceCache,
    tokens: TokenStore,
    transport: Arc<dyn Transport>,
}

impl Executor {
    pub(crate) fn new(
        spec: Arc<Specification>,
        base_url: String,
        cache: ResourceCache,
        tokens: TokenStore,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self { spec, base_url, cache, tokens, transport }
    }

    pub(crate) fn spec(&self) -> &Specification {
        &self.spec
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub(crate) fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Runs any verb. `get` goes through the cache, everything else doesn't.
    pub(crate) async fn execute(
        &self,
        chain: &[String],
        verb: Verb,
        payload: Option<&Value>,
    ) -> Result<Outcome<Response>, ClientError> {
        if verb == Verb::Get {
            Ok(self.read(chain, payload).await?.map(Response::Resource))
        } else {
            Ok(self.write(chain, verb, payload).await?.map(Response::Data))
        }
    }

    pub(crate) async fn read(
        &self,
        chain: &[String],
        payload: Option<&Value>,
    ) -> Result<Outcome<Resource>, ClientError> {
        let delivered = self.send(chain, Verb::Get, payload).await?;
        Ok(delivered.map(|Delivered { template, data }| {
            let key = CacheKey::new(&template, chain, payload);
            self.cache.get_or_create(key, data)
        }))
    }

    pub(crate) async fn write(
        &self,
        chain: &[String],
        verb: Verb,
        payload: Option<&Value>,
    ) -> Result<Outcome<Value>, ClientError> {
        Ok(self.send(chain, verb, payload).await?.map(|delivered| delivered.data))
    }

    async fn send(
        &self,
        chain: &[String],
        verb: Verb,
        payload: Option<&Value>,
    ) -> Result<Outcome<Delivered>, ClientError> {
        let template = find_template(&self.spec, chain)?;
        if template.operation(verb).is_none() {
            return Err(ResolveError::UnsupportedMethod {
                method: verb.as_method().to_string(),
                template: template.as_str().to_string(),
            }
            .into());
        }

        let mut url = build_url(&self.base_url, template, chain);
        if verb == Verb::Get {
            if let Some(payload) = payload {
                url.push_str(&build_query_string(payload));
            }
        }

        let mut request = HttpRequest::new(verb, url);
        if let Some(authorization) = self.tokens.authorization() {
            request.headers.push(("Authorization".to_string(), authorization));
        }
        if verb.sends_body() {
            if let Some(payload) = payload {
                let body = serde_json::to_string(payload)
                    .map_err(|e| ClientError::InvalidPayload(e.to_string()))?;
                request.headers.push(("Content-Type".to_string(), "application/json".to_string()));
                request.body = Some(body);
            }
        }

        tracing::debug!("[Executor] {} {} (template {})", verb, request.url, template.as_str());
        let response = self.transport.send(request).await?;

        let data = if response.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).map_err(|e| {
                ClientError::InvalidResponse(format!(
                    "{} {} returned invalid JSON: {}",
                    verb,
                    template.as_str(),
                    e
                ))
            })?
        };

        if !response.is_success() {
            tracing::warn!(
                "[Executor] {} {} failed with status {}",
                verb,
                template.as_str(),
                response.status
            );
            return Ok(Outcome::ServerError(ServerFailure {
                status: response.status,
                error: data,
                path: template.as_str().to_string(),
                method: verb,
            }));
        }

        tracing::debug!("[Executor] {} {} -> {}", verb, template.as_str(), response.status);
        Ok(Outcome::Success(Delivered { template: template.as_str().to_string(), data }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_helpers::{chain, sample_spec, RecordingTransport};
    use crate::transport::HttpResponse;
    use serde_json::json;

    fn executor(transport: Arc<RecordingTransport>, token: Option<&str>) -> Executor {
        Executor::new(
            Arc::new(sample_spec()),
            "https://api.local".to_string(),
            ResourceCache::new(),
            TokenStore::new(token.map(str::to_string)),
            transport,
        )
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let transport = Arc::new(RecordingTransport::ok());
        let executor = executor(transport.clone(), None);
        let payload = json!({"email": "hello@example.com", "password": "secret"});

        let outcome =
            executor.write(&chain(&["auth", "login"]), Verb::Post, Some(&payload)).await.unwrap();
        assert_eq!(outcome, Outcome::Success(json!({"ok": true})));

        let request = transport.last().unwrap();
        assert_eq!(request.method, Verb::Post);
        assert_eq!(request.url, "https://api.local/auth/login");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(payload.to_string().as_str()));
        assert_eq!(request.header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_get_payload_goes_to_query() {
        let transport = Arc::new(RecordingTransport::ok());
        let executor = executor(transport.clone(), None);

        executor
            .read(&chain(&["users"]), Some(&json!({"page": 2, "limit": 25, "search": "john"})))
            .await
            .unwrap();

        let request = transport.last().unwrap();
        assert_eq!(request.url, "https://api.local/users?page=2&limit=25&search=john");
        assert_eq!(request.body, None);
        assert_eq!(request.header("Content-Type"), None);
    }

    #[tokio::test]
    async fn test_delete_without_payload_has_no_body() {
        let transport = Arc::new(RecordingTransport::ok());
        let executor = executor(transport.clone(), Some("token-123"));

        executor.write(&chain(&["users", "7"]), Verb::Delete, Some(&json!({"x": 1}))).await.unwrap();

        let request = transport.last().unwrap();
        assert_eq!(request.url, "https://api.local/users/7");
        assert_eq!(request.body, None);
        assert_eq!(request.header("Authorization"), Some("Bearer token-123"));
    }

    #[tokio::test]
    async fn test_resolution_errors_send_nothing() {
        let transport = Arc::new(RecordingTransport::ok());
        let executor = executor(transport.clone(), None);

        let err = executor.write(&chain(&["nope"]), Verb::Post, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Resolve(ResolveError::UnresolvedEndpoint { .. })));

        let err = executor.write(&chain(&["auth", "login"]), Verb::Delete, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Method DELETE not supported on /auth/login");
        assert!(err.is_resolution());

        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_server_failure_is_data() {
        let transport = Arc::new(RecordingTransport::responding(|_| {
            HttpResponse::new(404, r#"{"message":"no such user"}"#)
        }));
        let executor = executor(transport, None);

        let outcome = executor.read(&chain(&["users", "42"]), None).await.unwrap();
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.status, 404);
        assert_eq!(failure.error, json!({"message": "no such user"}));
        assert_eq!(failure.path, "/users/{id}");
        assert_eq!(failure.method, Verb::Get);
        assert!(executor.cache().is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let transport = Arc::new(RecordingTransport::responding(|_| HttpResponse::new(204, "")));
        let executor = executor(transport, None);

        let outcome = executor.write(&chain(&["users", "42"]), Verb::Delete, None).await.unwrap();
        assert_eq!(outcome, Outcome::Success(Value::Null));
    }

    #[tokio::test]
    async fn test_invalid_json_is_hard_failure() {
        let transport =
            Arc::new(RecordingTransport::responding(|_| HttpResponse::new(200, "<html>")));
        let executor = executor(transport, None);

        let err = executor.read(&chain(&["users"]), None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_reads_share_resource_across_payload_order() {
        let transport = Arc::new(RecordingTransport::ok());
        let executor = executor(transport.clone(), None);

        let first = executor.read(&chain(&["users"]), Some(&json!({"a": 1, "b": 2}))).await.unwrap();
        let second =
            executor.read(&chain(&["users"]), Some(&json!({"b": 2, "a": 1}))).await.unwrap();

        assert!(first.success().unwrap().ptr_eq(&second.success().unwrap()));
        assert_eq!(transport.count(), 2);
        assert_eq!(executor.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_verb() {
        let transport = Arc::new(RecordingTransport::ok());
        let executor = executor(transport, None);

        let read = executor.execute(&chain(&["users"]), Verb::Get, None).await.unwrap();
        assert!(matches!(read.success(), Some(Response::Resource(_))));

        let write = executor.execute(&chain(&["users"]), Verb::Post, None).await.unwrap();
        let data = write.success().unwrap();
        assert_eq!(data.to_value(), json!({"ok": true}));
        assert_eq!(data.into_data(), Some(json!({"ok": true})));
    }
}
