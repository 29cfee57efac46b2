use crate::{BlockingCache, FoyerCache, MemoryCache, MokaCache};
use shared::config::StoreBackend;
use shared::{Error, Result};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use txcache::{CacheConfig, CacheStore, StorageFactory};

const DEFAULT_FOYER_CAPACITY: u64 = 10_000;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Lock wait bound for a blocking cache. A session that re-reads a key it
/// already missed waits on its own lock, so there is always a bound.
fn lock_timeout(config: &CacheConfig) -> Duration {
    match config.lock_timeout_ms {
        Some(ms) => Duration::from_millis(ms),
        None => {
            warn!(
                "Cache '{}': blocking without a lock timeout, using {}ms",
                config.name, DEFAULT_LOCK_TIMEOUT_MS
            );
            Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS)
        }
    }
}

/// Builds any supported backend from a [`CacheConfig`], wrapping it in a
/// [`BlockingCache`] when requested
#[derive(Clone, Copy, Debug, Default)]
pub struct UnifiedStorageFactory;

impl<K, V> StorageFactory<K, V> for UnifiedStorageFactory
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn create_from_config(&self, config: &CacheConfig) -> Result<Arc<dyn CacheStore<K, V>>> {
        if !config.id().is_valid() {
            return Err(Error::InvalidCacheId(config.name.clone()));
        }

        let store: Arc<dyn CacheStore<K, V>> = match config.backend {
            StoreBackend::Memory => {
                if config.max_entries.is_some() || config.default_ttl_ms.is_some() {
                    warn!(
                        "Cache '{}': memory backend is unbounded, ignoring capacity and TTL",
                        config.name
                    );
                }
                Arc::new(MemoryCache::new(config.name.clone()))
            }
            StoreBackend::Moka => Arc::new(MokaCache::new(
                config.name.clone(),
                config.max_entries,
                config.default_ttl_ms.map(Duration::from_millis),
            )),
            StoreBackend::Foyer => {
                if config.default_ttl_ms.is_some() {
                    warn!("Cache '{}': foyer backend has no TTL, ignoring it", config.name);
                }
                let capacity = config.max_entries.unwrap_or(DEFAULT_FOYER_CAPACITY);
                Arc::new(FoyerCache::new(config.name.clone(), capacity as usize))
            }
        };

        info!(
            "Created cache '{}' (backend: {}, blocking: {})",
            config.name,
            config.backend.as_str(),
            config.blocking
        );

        if config.blocking {
            Ok(Arc::new(BlockingCache::new(store, Some(lock_timeout(config)))))
        } else {
            Ok(store)
        }
    }
}
