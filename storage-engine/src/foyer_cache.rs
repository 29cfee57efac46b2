use async_trait::async_trait;
use foyer::{Cache, CacheBuilder};
use shared::Result;
use std::fmt::Debug;
use std::hash::Hash;
use txcache::{CacheId, CacheStore, CachedValue};

/// Foyer-based in-memory cache implementation
pub struct FoyerCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    id: CacheId,
    cache: Cache<K, CachedValue<V>>,
}

impl<K, V> FoyerCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    /// Create a new Foyer in-memory cache holding at most `capacity` entries
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let name = name.into();
        let cache = CacheBuilder::new(capacity).with_name(name.clone()).build();

        Self {
            id: CacheId::new(name),
            cache,
        }
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for FoyerCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn id(&self) -> &CacheId {
        &self.id
    }

    fn size(&self) -> u64 {
        // Every entry weighs 1, so usage is the entry count
        self.cache.usage() as u64
    }

    async fn get(&self, key: &K) -> Result<Option<CachedValue<V>>> {
        Ok(self.cache.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: K, val: CachedValue<V>) -> Result<()> {
        self.cache.insert(key, val);
        Ok(())
    }

    async fn remove(&self, key: &K) -> Result<bool> {
        Ok(self.cache.remove(key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.clear();
        Ok(())
    }
}

impl<K, V> Debug for FoyerCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoyerCache")
            .field("id", &self.id)
            .field("cache", &"<foyer::Cache>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_foyer_cache_put_and_get() {
        let cache = FoyerCache::new("test", 1024);

        cache.put("hello", CachedValue::Value("world")).await.unwrap();

        let value = cache.get(&"hello").await.unwrap();
        assert_eq!(value, Some(CachedValue::Value("world")));
        assert_eq!(cache.size(), 1);
    }

    #[tokio::test]
    async fn test_foyer_cache_get_nonexistent() {
        let cache: FoyerCache<&str, &str> = FoyerCache::new("test", 1024);

        assert_eq!(cache.get(&"nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_foyer_cache_null_and_remove() {
        let cache: FoyerCache<&str, &str> = FoyerCache::new("test", 1024);

        cache.put("empty", CachedValue::Null).await.unwrap();
        assert_eq!(cache.get(&"empty").await.unwrap(), Some(CachedValue::Null));

        assert!(cache.remove(&"empty").await.unwrap());
        assert_eq!(cache.get(&"empty").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_foyer_cache_clear() {
        let cache = FoyerCache::new("test", 1024);

        cache.put("a", CachedValue::Value(1)).await.unwrap();
        cache.put("b", CachedValue::Value(2)).await.unwrap();
        cache.clear().await.unwrap();

        assert_eq!(cache.get(&"a").await.unwrap(), None);
        assert_eq!(cache.size(), 0);
    }
}
