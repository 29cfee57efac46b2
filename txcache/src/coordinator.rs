use crate::domain::{CacheId, CachedValue};
use crate::ports::CacheStore;
use crate::staging::StagingCache;
use shared::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-unit-of-work manager of staging caches.
///
/// Creates one [`StagingCache`] per underlying cache on first use and gives
/// the owner a single commit/rollback pair for all of them.
pub struct CacheCoordinator<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    // Maps underlying cache id -> staging cache for this unit of work
    registry: BTreeMap<CacheId, StagingCache<K, V>>,
}

impl<K, V> CacheCoordinator<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: BTreeMap::new(),
        }
    }

    pub async fn get(
        &mut self,
        cache: &Arc<dyn CacheStore<K, V>>,
        key: &K,
    ) -> Result<Option<CachedValue<V>>> {
        self.staging_cache(cache)?.get(key).await
    }

    pub fn put(
        &mut self,
        cache: &Arc<dyn CacheStore<K, V>>,
        key: K,
        value: CachedValue<V>,
    ) -> Result<()> {
        self.staging_cache(cache)?.put(key, value);
        Ok(())
    }

    pub fn clear(&mut self, cache: &Arc<dyn CacheStore<K, V>>) -> Result<()> {
        self.staging_cache(cache)?.clear();
        Ok(())
    }

    /// Commit every staging cache, in cache id order.
    ///
    /// All caches are attempted even when one fails. If any failed the result
    /// is [`Error::PartialCommit`], listing which caches were committed and
    /// which were not. Failed caches keep their staged state, so a following
    /// [`rollback`](Self::rollback) still releases their misses.
    pub async fn commit(&mut self) -> Result<()> {
        let mut committed = Vec::new();
        let mut failed = Vec::new();

        for (id, staging) in self.registry.iter_mut() {
            match staging.commit().await {
                Ok(()) => committed.push(id.to_string()),
                Err(e) => {
                    warn!(cache = %id, "commit failed: {}", e);
                    failed.push((id.to_string(), e));
                }
            }
        }

        debug!(
            committed = committed.len(),
            failed = failed.len(),
            "coordinator commit finished"
        );

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::PartialCommit { committed, failed })
        }
    }

    /// Roll back every staging cache. Unlock failures are logged per key by
    /// the staging caches, so this cannot fail.
    pub async fn rollback(&mut self) {
        for staging in self.registry.values_mut() {
            staging.rollback().await;
        }
        debug!(caches = self.registry.len(), "coordinator rollback finished");
    }

    /// Number of underlying caches touched so far
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn cache_ids(&self) -> impl Iterator<Item = &CacheId> {
        self.registry.keys()
    }

    pub fn staging(&self, id: &CacheId) -> Option<&StagingCache<K, V>> {
        self.registry.get(id)
    }

    fn staging_cache(
        &mut self,
        cache: &Arc<dyn CacheStore<K, V>>,
    ) -> Result<&mut StagingCache<K, V>> {
        let id = cache.id();
        if !id.is_valid() {
            return Err(Error::InvalidCacheId(id.to_string()));
        }

        Ok(self
            .registry
            .entry(id.clone())
            .or_insert_with(|| StagingCache::new(Arc::clone(cache))))
    }
}

impl<K, V> Default for CacheCoordinator<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for CacheCoordinator<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        for (id, staging) in &self.registry {
            if staging.missed_len() > 0 {
                warn!(
                    cache = %id,
                    missed = staging.missed_len(),
                    "coordinator dropped without commit or rollback, blocking locks may stay held"
                );
            }
        }
    }
}

impl<K, V> Debug for CacheCoordinator<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("caches", &self.registry.values().collect::<Vec<_>>())
            .finish()
    }
}
