use async_trait::async_trait;
use dashmap::DashMap;
use shared::{Error, Result};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use txcache::{CacheId, CacheStore, CachedValue};

/// Decorator that serialises loading of a missing key.
///
/// A `get` takes a per-key lock first. On a hit the lock is released straight
/// away; on a miss it stays held, so concurrent readers of the same key wait
/// instead of all going to the database. The holder resolves the miss with a
/// `put` (lock released after the write) or gives up with `remove`, which only
/// releases the lock and leaves the delegate untouched.
///
/// The lock is not re-entrant: the holder must not `get` the same key again
/// before resolving it.
pub struct BlockingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    delegate: Arc<dyn CacheStore<K, V>>,
    locks: DashMap<K, Arc<Semaphore>>,
    held: DashMap<K, OwnedSemaphorePermit>,
    timeout: Option<Duration>,
}

impl<K, V> BlockingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    /// Wrap `delegate`. With `timeout` set, waiting longer than that for a
    /// key's lock fails with [`Error::LockTimeout`].
    pub fn new(delegate: Arc<dyn CacheStore<K, V>>, timeout: Option<Duration>) -> Self {
        Self {
            delegate,
            locks: DashMap::new(),
            held: DashMap::new(),
            timeout,
        }
    }

    async fn acquire_lock(&self, key: &K) -> Result<()> {
        let lock = {
            let entry = self
                .locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Semaphore::new(1)));
            Arc::clone(&entry)
        };

        let acquired = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, lock.acquire_owned())
                .await
                .map_err(|_| {
                    self.discard_idle_lock(key);
                    Error::LockTimeout {
                        cache: self.id().to_string(),
                        key: format!("{:?}", key),
                        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    }
                })?,
            None => lock.acquire_owned().await,
        };
        let permit = acquired
            .map_err(|_| Error::Internal(format!("lock for key {:?} was closed", key)))?;

        self.held.insert(key.clone(), permit);
        Ok(())
    }

    fn release_lock(&self, key: &K) {
        self.held.remove(key);
        self.discard_idle_lock(key);
    }

    /// Drop the key's semaphore once nobody holds or waits on it. Holders and
    /// waiters each keep a clone of the `Arc`, so a count of one means idle.
    fn discard_idle_lock(&self, key: &K) {
        self.locks.remove_if(key, |_, lock| {
            Arc::strong_count(lock) == 1 && lock.available_permits() == 1
        });
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for BlockingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn id(&self) -> &CacheId {
        self.delegate.id()
    }

    fn size(&self) -> u64 {
        self.delegate.size()
    }

    async fn get(&self, key: &K) -> Result<Option<CachedValue<V>>> {
        self.acquire_lock(key).await?;

        let value = match self.delegate.get(key).await {
            Ok(value) => value,
            Err(e) => {
                self.release_lock(key);
                return Err(e);
            }
        };

        if value.is_some() {
            self.release_lock(key);
        }
        Ok(value)
    }

    async fn put(&self, key: K, val: CachedValue<V>) -> Result<()> {
        let result = self.delegate.put(key.clone(), val).await;
        self.release_lock(&key);
        result
    }

    /// Releases the key's lock only; nothing is removed from the delegate.
    async fn remove(&self, key: &K) -> Result<bool> {
        self.release_lock(key);
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        self.delegate.clear().await
    }
}

impl<K, V> Debug for BlockingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingCache")
            .field("id", self.id())
            .field("locks", &self.locks.len())
            .field("held_locks", &self.held.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
