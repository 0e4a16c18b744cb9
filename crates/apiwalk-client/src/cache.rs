//! Identity-preserving cache of read results.
//!
//! Every successful read with the same [`CacheKey`] hands out the same
//! [`Resource`]; later reads overwrite its contents instead of replacing it, so
//! a caller holding an older handle always sees the latest server state.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Container shape, fixed when a resource is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// JSON array
    Sequence,
    /// JSON object
    Record,
    /// Anything else, boxed as `{ "value": ... }`
    Scalar,
}

impl Shape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => Shape::Sequence,
            Value::Object(_) => Shape::Record,
            _ => Shape::Scalar,
        }
    }
}

#[derive(Debug)]
enum Contents {
    Sequence(Vec<Value>),
    Record(Map<String, Value>),
    Scalar(Value),
}

impl Contents {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Contents::Sequence(items),
            Value::Object(fields) => Contents::Record(fields),
            scalar => Contents::Scalar(scalar),
        }
    }

    fn shape(&self) -> Shape {
        match self {
            Contents::Sequence(_) => Shape::Sequence,
            Contents::Record(_) => Shape::Record,
            Contents::Scalar(_) => Shape::Scalar,
        }
    }
}

#[derive(Debug)]
struct ResourceState {
    contents: Contents,
    refreshed_at: DateTime<Utc>,
    refreshes: u64,
    detached: bool,
}

/// Live, shared view of a cached read result.
///
/// Cloning yields another handle to the same resource; use
/// [`Resource::ptr_eq`] to compare identity.
#[derive(Clone)]
pub struct Resource {
    inner: Arc<RwLock<ResourceState>>,
}

impl Resource {
    pub(crate) fn new(data: Value) -> Self {
        let state = ResourceState {
            contents: Contents::from_value(data),
            refreshed_at: Utc::now(),
            refreshes: 0,
            detached: false,
        };
        Self { inner: Arc::new(RwLock::new(state)) }
    }

    /// Synchronizes contents in place. Hands `next` back when a sequence or
    /// record container receives data of another shape.
    fn sync(&self, next: Value) -> Result<(), Value> {
        let mut state = self.inner.write();
        match (&mut state.contents, next) {
            (Contents::Sequence(items), Value::Array(next)) => {
                items.clear();
                items.extend(next);
            },
            (Contents::Record(fields), Value::Object(next)) => {
                fields.retain(|key, _| next.contains_key(key));
                for (key, value) in next {
                    fields.insert(key, value);
                }
            },
            (Contents::Scalar(value), next) => {
                *value = next;
            },
            (_, next) => return Err(next),
        }
        state.refreshed_at = Utc::now();
        state.refreshes = state.refreshes.saturating_add(1);
        Ok(())
    }

    fn detach(&self) {
        self.inner.write().detached = true;
    }

    /// True when both handles refer to the same resource.
    pub fn ptr_eq(&self, other: &Resource) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn shape(&self) -> Shape {
        self.inner.read().contents.shape()
    }

    /// Current contents as JSON. Scalars come back boxed as `{"value": ...}`.
    pub fn snapshot(&self) -> Value {
        match &self.inner.read().contents {
            Contents::Sequence(items) => Value::Array(items.clone()),
            Contents::Record(fields) => Value::Object(fields.clone()),
            Contents::Scalar(value) => {
                let mut boxed = Map::new();
                boxed.insert("value".to_string(), value.clone());
                Value::Object(boxed)
            },
        }
    }

    /// The boxed value of a scalar resource.
    pub fn value(&self) -> Option<Value> {
        match &self.inner.read().contents {
            Contents::Scalar(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Field of a record resource.
    pub fn get(&self, key: &str) -> Option<Value> {
        match &self.inner.read().contents {
            Contents::Record(fields) => fields.get(key).cloned(),
            _ => None,
        }
    }

    /// Element of a sequence resource.
    pub fn index(&self, index: usize) -> Option<Value> {
        match &self.inner.read().contents {
            Contents::Sequence(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Runs `f` against the elements of a sequence resource without cloning.
    pub fn with_items<R>(&self, f: impl FnOnce(&[Value]) -> R) -> Option<R> {
        match &self.inner.read().contents {
            Contents::Sequence(items) => Some(f(items)),
            _ => None,
        }
    }

    /// Runs `f` against the fields of a record resource without cloning.
    pub fn with_fields<R>(&self, f: impl FnOnce(&Map<String, Value>) -> R) -> Option<R> {
        match &self.inner.read().contents {
            Contents::Record(fields) => Some(f(fields)),
            _ => None,
        }
    }

    /// Element count for sequences, key count for records, 1 for scalars.
    pub fn len(&self) -> usize {
        match &self.inner.read().contents {
            Contents::Sequence(items) => items.len(),
            Contents::Record(fields) => fields.len(),
            Contents::Scalar(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.inner.read().refreshed_at
    }

    /// Number of in-place refreshes since creation.
    pub fn refresh_count(&self) -> u64 {
        self.inner.read().refreshes
    }

    /// A detached resource was dropped from its cache and is no longer
    /// refreshed; its last contents remain readable.
    pub fn is_detached(&self) -> bool {
        self.inner.read().detached
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read();
        f.debug_struct("Resource")
            .field("contents", &state.contents)
            .field("refreshes", &state.refreshes)
            .field("detached", &state.detached)
            .finish()
    }
}

/// Cache key built from the matched template, the navigated chain, and the
/// canonicalized payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(template: &str, chain: &[String], payload: Option<&Value>) -> Self {
        let payload_key = match payload {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => canonicalize(other).to_string(),
        };
        Self(format!("{}|{}|{}", template, chain.join("/"), payload_key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sorts object keys recursively so key order never affects the key.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(fields.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&fields[key.as_str()]));
            }
            Value::Object(sorted)
        },
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

struct CacheEntry {
    resource: Resource,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(resource: Resource) -> Self {
        Self { resource, created_at: Utc::now() }
    }

    fn refresh(&self, data: Value) -> Result<(), Value> {
        self.resource.sync(data)
    }
}

/// Keyed store of live resources.
///
/// Cloning produces another handle to the same store, so one cache can be
/// shared by several clients.
#[derive(Clone, Default)]
pub struct ResourceCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes and returns the resource stored under `key`, or creates one
    /// shaped after `data`.
    ///
    /// If a stored sequence or record no longer fits `data`, it is detached
    /// and replaced by a new resource.
    pub fn get_or_create(&self, key: CacheKey, data: Value) -> Resource {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => match occupied.get().refresh(data) {
                Ok(()) => {
                    tracing::debug!("[ResourceCache] Refreshed {}", occupied.key());
                    occupied.get().resource.clone()
                },
                Err(data) => {
                    let previous = occupied.get().resource.shape();
                    tracing::warn!(
                        "[ResourceCache] Shape changed for {} ({:?} -> {:?}), replacing resource",
                        occupied.key(),
                        previous,
                        Shape::of(&data)
                    );
                    occupied.get().resource.detach();
                    let resource = Resource::new(data);
                    occupied.insert(CacheEntry::new(resource.clone()));
                    resource
                },
            },
            Entry::Vacant(vacant) => {
                tracing::debug!("[ResourceCache] Created {}", vacant.key());
                let resource = Resource::new(data);
                vacant.insert(CacheEntry::new(resource.clone()));
                resource
            },
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Resource> {
        self.entries.get(key).map(|entry| entry.resource.clone())
    }

    /// When the entry for `key` was first created.
    pub fn created_at(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.created_at)
    }

    /// Drops one entry. Returns whether it existed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        match self.entries.remove(key) {
            Some((_, entry)) => {
                entry.resource.detach();
                true
            },
            None => false,
        }
    }

    /// Drops every entry. Outstanding resources keep their last contents but
    /// are never refreshed again.
    pub fn clear(&self) {
        let mut cleared = 0usize;
        self.entries.retain(|_, entry| {
            entry.resource.detach();
            cleared += 1;
            false
        });
        tracing::debug!("[ResourceCache] Cleared {} entries", cleared);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache").field("entries", &self.entries.len()).finish()
    }
}
