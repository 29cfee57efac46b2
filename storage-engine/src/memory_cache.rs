use async_trait::async_trait;
use dashmap::DashMap;
use shared::Result;
use std::fmt::Debug;
use std::hash::Hash;
use txcache::{CacheId, CacheStore, CachedValue};

/// Unbounded in-process cache backed by a sharded concurrent map.
/// Never evicts; entries live until removed or cleared.
pub struct MemoryCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    id: CacheId,
    entries: DashMap<K, CachedValue<V>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CacheId::new(name),
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for MemoryCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn id(&self) -> &CacheId {
        &self.id
    }

    fn size(&self) -> u64 {
        self.entries.len() as u64
    }

    async fn get(&self, key: &K) -> Result<Option<CachedValue<V>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: K, val: CachedValue<V>) -> Result<()> {
        self.entries.insert(key, val);
        Ok(())
    }

    async fn remove(&self, key: &K) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

impl<K, V> Debug for MemoryCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("id", &self.id)
            .field("entry_count", &self.entries.len())
            .finish()
    }
}
