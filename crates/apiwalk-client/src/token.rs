//! Bearer credential state and its optional persistence.

use apiwalk_types::StorageError;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key/value string store the credential is mirrored to.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage, mostly useful for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/apiwalk`, e.g. `~/.local/share/apiwalk` on Linux.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("apiwalk")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(|c: char| c == '/' || c == '\\' || c == '\0');
        if !valid {
            return Err(StorageError::InvalidKey { key: key.to_string() });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_io_error(key, &e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::from_io_error(key, &e))?;
        std::fs::write(&path, value).map_err(|e| StorageError::from_io_error(key, &e))
    }
}

/// Persisted form: `{"token": "..."}` or `{"token": null}`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Clone)]
struct Persistence {
    storage: Arc<dyn TokenStorage>,
    key: String,
}

/// Current bearer credential of one client.
///
/// Cloning shares the same state.
#[derive(Clone)]
pub struct TokenStore {
    current: Arc<RwLock<Option<String>>>,
    persistence: Option<Persistence>,
}

impl TokenStore {
    /// Memory-only store.
    pub fn new(initial: Option<String>) -> Self {
        Self { current: Arc::new(RwLock::new(initial)), persistence: None }
    }

    /// Store mirrored to `storage` under `key`. A token already persisted
    /// there takes precedence over `initial`.
    pub fn with_storage(
        initial: Option<String>,
        storage: Arc<dyn TokenStorage>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let token = load_stored_token(storage.as_ref(), &key).or(initial);
        Self {
            current: Arc::new(RwLock::new(token)),
            persistence: Some(Persistence { storage, key }),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.current.read().clone()
    }

    /// Replaces the credential (`None` clears it) and mirrors the change to
    /// storage when configured.
    pub fn set(&self, token: Option<String>) {
        *self.current.write() = token.clone();
        if let Some(persistence) = &self.persistence {
            persist_token(persistence, token);
        }
    }

    /// `Bearer <token>` when a non-empty token is set.
    pub(crate) fn authorization(&self) -> Option<String> {
        self.current.read().as_deref().filter(|t| !t.is_empty()).map(|t| format!("Bearer {t}"))
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.persistence.as_ref().map(|p| p.key.as_str())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.current.read().is_some())
            .field("storage_key", &self.storage_key())
            .finish()
    }
}

fn load_stored_token(storage: &dyn TokenStorage, key: &str) -> Option<String> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return None,
        Err(e) => {
            tracing::warn!("[TokenStore] Unable to read stored token {}: {}", key, e);
            return None;
        },
    };

    match serde_json::from_str::<StoredToken>(&raw) {
        Ok(stored) => stored.token,
        Err(e) => {
            tracing::warn!("[TokenStore] Unable to parse stored token {}: {}", key, e);
            None
        },
    }
}

fn persist_token(persistence: &Persistence, token: Option<String>) {
    let payload = match serde_json::to_string(&StoredToken { token }) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("[TokenStore] Unable to encode token: {}", e);
            return;
        },
    };
    if let Err(e) = persistence.storage.set(&persistence.key, &payload) {
        tracing::warn!("[TokenStore] Unable to persist token {}: {}", persistence.key, e);
    }
}
