//! Client configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_timeout_secs() -> u64 {
    120
}

/// Options applied when a client is built from an OpenAPI document URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ClientConfig {
    /// Base URL requests are sent to. When unset, the document URL with a
    /// trailing `/openapi.json` removed is used.
    #[serde(default)]
    #[validate(url)]
    pub base_url: Option<String>,
    /// Initial bearer credential. A token found in persisted storage wins.
    #[serde(default)]
    pub token: Option<String>,
    /// Key under which the credential is persisted. No persistence when unset.
    #[serde(default)]
    #[validate(length(min = 1_u64))]
    pub storage_key: Option<String>,
    /// Timeout for the default HTTP transport, in seconds
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1_u64, max = 3600_u64))]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: None, token: None, storage_key: None, timeout_secs: default_timeout_secs() }
    }
}

impl ClientConfig {
    /// Reads `APIWALK_BASE_URL`, `APIWALK_TOKEN`, `APIWALK_STORAGE_KEY` and
    /// `APIWALK_TIMEOUT_SECS`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("APIWALK_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Ok(token) = std::env::var("APIWALK_TOKEN") {
            config.token = Some(token);
        }
        if let Ok(key) = std::env::var("APIWALK_STORAGE_KEY") {
            config.storage_key = Some(key);
        }
        if let Some(secs) =
            std::env::var("APIWALK_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }
}
