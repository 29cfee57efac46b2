use crate::domain::{CacheId, CachedValue};
use crate::ports::CacheStore;
use shared::Result;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};

/// Transactional buffer in front of one underlying cache.
///
/// Holds everything a unit of work wants to add to the shared cache. Entries
/// reach the delegate on [`commit`](Self::commit) and are discarded on
/// [`rollback`](Self::rollback). Reads always go to the delegate, so a unit of
/// work never sees its own uncommitted writes.
///
/// Every read that misses is remembered. On commit, misses that were never
/// written are stamped with [`CachedValue::Null`]; on rollback they are passed
/// to the delegate's `remove`. Either way a blocking delegate gets the signal
/// it needs to release the lock it took on the miss.
///
/// Mirrors the [`CacheStore`] operations but is not a `CacheStore`: its staging
/// state belongs to one unit of work, so it takes `&mut self` where the shared
/// port takes `&self`.
pub struct StagingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    delegate: Arc<dyn CacheStore<K, V>>,
    clear_requested: bool,
    pending_writes: HashMap<K, CachedValue<V>>,
    missed_keys: HashSet<K>,
}

impl<K, V> StagingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    pub fn new(delegate: Arc<dyn CacheStore<K, V>>) -> Self {
        Self {
            delegate,
            clear_requested: false,
            pending_writes: HashMap::new(),
            missed_keys: HashSet::new(),
        }
    }

    pub fn id(&self) -> &CacheId {
        self.delegate.id()
    }

    pub fn size(&self) -> u64 {
        self.delegate.size()
    }

    /// Read straight from the delegate, recording a miss.
    ///
    /// After [`clear`](Self::clear) this returns `None` for every key until the
    /// next commit or rollback.
    pub async fn get(&mut self, key: &K) -> Result<Option<CachedValue<V>>> {
        let value = self.delegate.get(key).await?;
        if value.is_none() {
            self.missed_keys.insert(key.clone());
        }

        if self.clear_requested {
            Ok(None)
        } else {
            Ok(value)
        }
    }

    pub fn put(&mut self, key: K, value: CachedValue<V>) {
        self.pending_writes.insert(key, value);
    }

    /// Per-key removal is not transactional; only [`clear`](Self::clear) is.
    pub fn remove(&mut self, _key: &K) {}

    /// Stage a clear of the delegate and drop everything staged so far.
    /// Recorded misses are kept so they still get released.
    pub fn clear(&mut self) {
        self.clear_requested = true;
        self.pending_writes.clear();
    }

    /// Apply the staged clear and writes to the delegate, then reset.
    ///
    /// A delegate failure is returned as-is and leaves the staged state in
    /// place, so the caller can still [`rollback`](Self::rollback) to release
    /// the locks taken on misses.
    pub async fn commit(&mut self) -> Result<()> {
        if self.clear_requested {
            self.delegate.clear().await?;
        }
        self.flush_pending_entries().await?;

        debug!(
            cache = %self.id(),
            cleared = self.clear_requested,
            written = self.pending_writes.len(),
            missed = self.missed_keys.len(),
            "committed staged entries"
        );
        self.reset();
        Ok(())
    }

    /// Release every recorded miss and discard the staged writes.
    pub async fn rollback(&mut self) {
        self.unlock_missed_entries().await;

        debug!(
            cache = %self.id(),
            discarded = self.pending_writes.len(),
            released = self.missed_keys.len(),
            "rolled back staged entries"
        );
        self.reset();
    }

    pub fn has_pending(&self) -> bool {
        self.clear_requested || !self.pending_writes.is_empty() || !self.missed_keys.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending_writes.len()
    }

    pub fn missed_len(&self) -> usize {
        self.missed_keys.len()
    }

    pub fn clear_requested(&self) -> bool {
        self.clear_requested
    }

    fn reset(&mut self) {
        self.clear_requested = false;
        self.pending_writes.clear();
        self.missed_keys.clear();
    }

    async fn flush_pending_entries(&self) -> Result<()> {
        for (key, value) in &self.pending_writes {
            self.delegate.put(key.clone(), value.clone()).await?;
        }
        // Explicit writes above win over null-stamps
        for key in &self.missed_keys {
            if !self.pending_writes.contains_key(key) {
                self.delegate.put(key.clone(), CachedValue::Null).await?;
            }
        }
        Ok(())
    }

    async fn unlock_missed_entries(&self) {
        for key in &self.missed_keys {
            if let Err(e) = self.delegate.remove(key).await {
                warn!(
                    cache = %self.id(),
                    "Unexpected error while releasing key {:?} on rollback, \
                     the cache adapter may not support blocking: {}",
                    key,
                    e
                );
            }
        }
    }
}

impl<K, V> Debug for StagingCache<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingCache")
            .field("delegate", self.id())
            .field("clear_requested", &self.clear_requested)
            .field("pending_writes", &self.pending_writes.len())
            .field("missed_keys", &self.missed_keys.len())
            .finish()
    }
}
