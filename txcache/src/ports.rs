#![deny(clippy::all)]

use crate::domain::{CacheConfig, CacheId, CachedValue};
use async_trait::async_trait;
use shared::Result;
use std::sync::Arc;

// Ports are the pluggable extension points for underlying cache implementations

/// Port for creating cache storage from configuration
/// This allows different storage backends to be plugged in
pub trait StorageFactory<K, V>: Send + Sync + 'static {
    /// Create a new cache store from configuration
    fn create_from_config(&self, config: &CacheConfig) -> Result<Arc<dyn CacheStore<K, V>>>;
}

/// Port for the shared, underlying cache (e.g., Moka, Foyer)
///
/// Implementations own their thread-safety. A `get` that returns `None` means
/// the key was never cached; a stored `CachedValue::Null` is a cached "nothing".
/// Blocking implementations may hold a per-key lock after a miss until the same
/// key is `put` or `remove`d.
#[async_trait]
pub trait CacheStore<K, V>: Send + Sync + 'static {
    /// Stable identity; two stores with the same id are the same cache
    fn id(&self) -> &CacheId;

    /// Approximate number of entries
    fn size(&self) -> u64;

    async fn get(&self, key: &K) -> Result<Option<CachedValue<V>>>;
    async fn put(&self, key: K, val: CachedValue<V>) -> Result<()>;
    async fn remove(&self, key: &K) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
}
