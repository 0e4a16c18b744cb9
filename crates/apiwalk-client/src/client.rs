use apiwalk_types::{ClientConfig, Verb};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::cache::ResourceCache;
use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::executor::Executor;
use crate::spec::Specification;
use crate::token::{FileStorage, TokenStorage, TokenStore};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};

const OPENAPI_SUFFIX: &str = "/openapi.json";

/// Default base URL: the document URL without a trailing `/openapi.json`.
pub fn derive_base_url(openapi_url: &str) -> String {
    openapi_url.strip_suffix(OPENAPI_SUFFIX).unwrap_or(openapi_url).to_string()
}

/// Client for one API, built from its OpenAPI document.
///
/// Cheap to clone; clones share the document, cache and credential.
#[derive(Clone)]
pub struct ApiClient {
    executor: Arc<Executor>,
}

impl ApiClient {
    pub fn builder(openapi_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(openapi_url)
    }

    /// Fetches the document with default options.
    pub async fn connect(openapi_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder(openapi_url).build().await
    }

    pub(crate) fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Starts a navigation chain.
    pub fn path(&self, segment: impl ToString) -> Endpoint {
        Endpoint::new(self.clone(), vec![segment.to_string()])
    }

    /// Navigates a whole slash-separated path at once; empty pieces are dropped.
    pub fn resolve(&self, path: &str) -> Endpoint {
        let chain = path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect();
        Endpoint::new(self.clone(), chain)
    }

    /// Endpoint with an empty chain, e.g. for a `/` template.
    pub fn root(&self) -> Endpoint {
        Endpoint::new(self.clone(), Vec::new())
    }

    pub fn token(&self) -> Option<String> {
        self.executor.tokens().get()
    }

    pub fn get_token(&self) -> Option<String> {
        self.token()
    }

    /// Sets (or with `None`, clears) the bearer credential for all later requests.
    pub fn set_token(&self, token: Option<String>) {
        self.executor.tokens().set(token);
    }

    /// Drops every cached resource.
    pub fn clear(&self) {
        self.executor.cache().clear();
    }

    pub fn cache(&self) -> &ResourceCache {
        self.executor.cache()
    }

    pub fn specification(&self) -> &Specification {
        self.executor.spec()
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url())
            .field("templates", &self.specification().len())
            .field("cache", self.cache())
            .finish()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    openapi_url: String,
    config: ClientConfig,
    cache: Option<ResourceCache>,
    transport: Option<Arc<dyn Transport>>,
    storage: Option<Arc<dyn TokenStorage>>,
    specification: Option<Specification>,
}

impl ApiClientBuilder {
    pub fn new(openapi_url: impl Into<String>) -> Self {
        Self {
            openapi_url: openapi_url.into(),
            config: ClientConfig::default(),
            cache: None,
            transport: None,
            storage: None,
            specification: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.config.storage_key = Some(key.into());
        self
    }

    /// Shares an existing cache instead of creating a private one.
    pub fn cache(mut self, cache: ResourceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Backend for the persisted credential. Defaults to [`FileStorage`] in
    /// the user data directory when a storage key is set.
    pub fn storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Uses an already loaded document instead of fetching one.
    pub fn specification(mut self, specification: Specification) -> Self {
        self.specification = Some(specification);
        self
    }

    pub async fn build(self) -> Result<ApiClient, ClientError> {
        self.config.validate().map_err(|e| ClientError::Config(e.to_string()))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(Duration::from_secs(self.config.timeout_secs))?),
        };

        let spec = match self.specification {
            Some(spec) => spec,
            None => fetch_specification(transport.as_ref(), &self.openapi_url).await?,
        };

        let base_url =
            self.config.base_url.clone().unwrap_or_else(|| derive_base_url(&self.openapi_url));

        let tokens = match &self.config.storage_key {
            Some(key) => match self.storage.or_else(default_storage) {
                Some(storage) => TokenStore::with_storage(self.config.token.clone(), storage, key),
                None => {
                    tracing::warn!(
                        "[ApiClient] No storage available for key {}, token will not persist",
                        key
                    );
                    TokenStore::new(self.config.token.clone())
                },
            },
            None => TokenStore::new(self.config.token.clone()),
        };

        tracing::info!(
            "[ApiClient] Ready: {} path templates, base URL {}",
            spec.len(),
            base_url
        );

        let executor = Executor::new(
            Arc::new(spec),
            base_url,
            self.cache.unwrap_or_default(),
            tokens,
            transport,
        );
        Ok(ApiClient { executor: Arc::new(executor) })
    }
}

fn default_storage() -> Option<Arc<dyn TokenStorage>> {
    FileStorage::default_location().map(|storage| Arc::new(storage) as Arc<dyn TokenStorage>)
}

async fn fetch_specification(
    transport: &dyn Transport,
    openapi_url: &str,
) -> Result<Specification, ClientError> {
    tracing::debug!("[ApiClient] Fetching OpenAPI document from {}", openapi_url);
    let response = transport.send(HttpRequest::new(Verb::Get, openapi_url)).await?;
    if !response.is_success() {
        return Err(ClientError::Bootstrap { status: response.status, url: openapi_url.to_string() });
    }
    Ok(Specification::from_json_str(&response.body)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_document, RecordingTransport};
    use crate::token::MemoryStorage;
    use crate::transport::HttpResponse;

    fn document_transport() -> Arc<RecordingTransport> {
        Arc::new(RecordingTransport::responding(|request| {
            if request.url.ends_with("/openapi.json") {
                HttpResponse::new(200, sample_document().to_string())
            } else {
                HttpResponse::new(200, r#"{"ok":true}"#)
            }
        }))
    }

    #[test]
    fn test_derive_base_url() {
        assert_eq!(derive_base_url("https://api.local/openapi.json"), "https://api.local");
        assert_eq!(derive_base_url("https://api.local/v1/openapi.json"), "https://api.local/v1");
        assert_eq!(derive_base_url("https://api.local/spec.json"), "https://api.local/spec.json");
    }

    #[tokio::test]
    async fn test_bootstrap_fetches_document_first() {
        let transport = document_transport();
        let client = ApiClient::builder("https://api.local/openapi.json")
            .transport(transport.clone())
            .build()
            .await
            .unwrap();

        assert_eq!(transport.count(), 1);
        assert_eq!(transport.last().unwrap().url, "https://api.local/openapi.json");
        assert_eq!(client.base_url(), "https://api.local");
        assert_eq!(client.specification().title(), Some("Sample"));

        client.path("auth").path("login").post(None).await.unwrap();
        assert_eq!(transport.last().unwrap().url, "https://api.local/auth/login");
    }

    #[tokio::test]
    async fn test_base_url_override() {
        let transport = document_transport();
        let client = ApiClient::builder("https://docs.local/openapi.json")
            .base_url("https://api.local/v2")
            .transport(transport.clone())
            .build()
            .await
            .unwrap();

        client.resolve("/users/7/").get(None).await.unwrap();
        assert_eq!(transport.last().unwrap().url, "https://api.local/v2/users/7");
    }

    #[tokio::test]
    async fn test_bootstrap_failure_status() {
        let transport = Arc::new(RecordingTransport::responding(|_| HttpResponse::new(503, "")));
        let err = ApiClient::builder("https://api.local/openapi.json")
            .transport(transport)
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Bootstrap { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let err = ApiClient::builder("https://api.local/openapi.json")
            .config(ClientConfig { timeout_secs: 0, ..ClientConfig::default() })
            .transport(document_transport())
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn test_token_from_storage_and_option() {
        let storage = Arc::new(MemoryStorage::new());

        let client = ApiClient::builder("https://api.local/openapi.json")
            .token("provided")
            .storage_key("sdk-auth")
            .storage(storage.clone())
            .transport(document_transport())
            .build()
            .await
            .unwrap();
        assert_eq!(client.token().as_deref(), Some("provided"));

        client.set_token(Some("persisted".to_string()));

        let reopened = ApiClient::builder("https://api.local/openapi.json")
            .token("provided")
            .storage_key("sdk-auth")
            .storage(storage)
            .transport(document_transport())
            .build()
            .await
            .unwrap();
        assert_eq!(reopened.get_token().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_shared_cache_between_clients() {
        let cache = ResourceCache::new();
        let transport = document_transport();
        let build = || {
            ApiClient::builder("https://api.local/openapi.json")
                .cache(cache.clone())
                .transport(transport.clone())
                .build()
        };
        let first = build().await.unwrap();
        let second = build().await.unwrap();

        let a = first.path("users").get(None).await.unwrap().success().unwrap();
        let b = second.path("users").get(None).await.unwrap().success().unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_root_endpoint_has_empty_chain() {
        let client = ApiClient::builder("https://api.local/openapi.json")
            .transport(document_transport())
            .build()
            .await
            .unwrap();
        assert!(client.root().chain().is_empty());
        assert!(client.root().get(None).await.unwrap_err().is_resolution());
    }
}
