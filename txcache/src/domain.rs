use shared::config::{Config, StoreBackend};
use std::fmt;

/// Identity token of an underlying cache. Compared by value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheId(String);

impl CacheId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A usable id is non-blank
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// What an underlying cache holds for a key.
///
/// `Null` records that the key was looked up and legitimately resolved to
/// nothing, which is different from the key never having been cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CachedValue<V> {
    Value(V),
    Null,
}

impl<V> CachedValue<V> {
    pub fn is_null(&self) -> bool {
        matches!(self, CachedValue::Null)
    }

    pub fn as_value(&self) -> Option<&V> {
        match self {
            CachedValue::Value(v) => Some(v),
            CachedValue::Null => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            CachedValue::Value(v) => Some(v),
            CachedValue::Null => None,
        }
    }
}

impl<V> From<Option<V>> for CachedValue<V> {
    fn from(value: Option<V>) -> Self {
        match value {
            Some(v) => CachedValue::Value(v),
            None => CachedValue::Null,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub name: String,                 // unique cache name, becomes the CacheId
    pub backend: StoreBackend,        // default: moka
    pub max_entries: Option<u64>,     // None = unbounded (foyer needs a bound)
    pub default_ttl_ms: Option<u64>,  // moka only
    pub blocking: bool,               // wrap in BlockingCache
    pub lock_timeout_ms: Option<u64>, // None = factory default
}

impl CacheConfig {
    pub fn new(name: impl Into<String>, backend: StoreBackend) -> Self {
        Self {
            name: name.into(),
            backend,
            max_entries: None,
            default_ttl_ms: None,
            blocking: false,
            lock_timeout_ms: None,
        }
    }

    /// Per-cache config seeded from process-wide settings
    pub fn with_defaults(name: impl Into<String>, config: &Config) -> Self {
        Self {
            name: name.into(),
            backend: config.backend,
            max_entries: config.max_entries,
            default_ttl_ms: config.default_ttl_ms,
            blocking: config.blocking,
            lock_timeout_ms: config.lock_timeout_ms,
        }
    }

    pub fn id(&self) -> CacheId {
        CacheId::new(self.name.clone())
    }
}
