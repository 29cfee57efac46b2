use async_trait::async_trait;
use moka::future::Cache;
use shared::Result;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;
use txcache::{CacheId, CacheStore, CachedValue};

/// Moka-based cache implementation with TTL support
/// Provides lock-free, concurrent cache with optional size bounds and TTL
pub struct MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    id: CacheId,
    cache: Cache<K, CachedValue<V>>,
}

impl<K, V> MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    /// Create a Moka cache from name, optional capacity and optional TTL
    pub fn new(
        name: impl Into<String>,
        max_entries: Option<u64>,
        default_ttl: Option<Duration>,
    ) -> Self {
        let name = name.into();
        let mut builder = Cache::builder().name(&name);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = default_ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            id: CacheId::new(name),
            cache: builder.build(),
        }
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn id(&self) -> &CacheId {
        &self.id
    }

    fn size(&self) -> u64 {
        self.cache.entry_count()
    }

    async fn get(&self, key: &K) -> Result<Option<CachedValue<V>>> {
        // None when the key doesn't exist or its TTL expired
        Ok(self.cache.get(key).await)
    }

    async fn put(&self, key: K, val: CachedValue<V>) -> Result<()> {
        self.cache.insert(key, val).await;
        Ok(())
    }

    async fn remove(&self, key: &K) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

impl<K, V> Debug for MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("id", &self.id)
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
