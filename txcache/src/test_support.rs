use crate::domain::{CacheId, CachedValue};
use crate::ports::CacheStore;
use async_trait::async_trait;
use shared::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call<K, V> {
    Get(K),
    Put(K, CachedValue<V>),
    Remove(K),
    Clear,
}

struct State<K, V> {
    entries: HashMap<K, CachedValue<V>>,
    calls: Vec<Call<K, V>>,
    failing_removes: HashSet<K>,
    fail_puts: bool,
    fail_clear: bool,
}

/// In-memory store that records every call and can be told to fail
pub struct RecordingStore<K, V> {
    id: CacheId,
    state: Mutex<State<K, V>>,
}

impl<K, V> RecordingStore<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    pub fn new(id: &str) -> Self {
        Self {
            id: CacheId::new(id),
            state: Mutex::new(State {
                entries: HashMap::new(),
                calls: Vec::new(),
                failing_removes: HashSet::new(),
                fail_puts: false,
                fail_clear: false,
            }),
        }
    }

    pub fn with_entries(id: &str, entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let store = Self::new(id);
        store.state.lock().unwrap().entries = entries
            .into_iter()
            .map(|(k, v)| (k, CachedValue::Value(v)))
            .collect();
        store
    }

    pub fn fail_remove_of(self, key: K) -> Self {
        self.state.lock().unwrap().failing_removes.insert(key);
        self
    }

    pub fn fail_puts(self) -> Self {
        self.state.lock().unwrap().fail_puts = true;
        self
    }

    pub fn fail_clear(self) -> Self {
        self.state.lock().unwrap().fail_clear = true;
        self
    }

    pub fn entry(&self, key: &K) -> Option<CachedValue<V>> {
        self.state.lock().unwrap().entries.get(key).cloned()
    }

    pub fn calls(&self) -> Vec<Call<K, V>> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than reads, in order
    pub fn writes(&self) -> Vec<Call<K, V>> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Get(_)))
            .collect()
    }

    pub fn remove_count(&self, key: &K) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Remove(k) if k == key))
            .count()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for RecordingStore<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn id(&self) -> &CacheId {
        &self.id
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }

    async fn get(&self, key: &K) -> Result<Option<CachedValue<V>>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get(key.clone()));
        Ok(state.entries.get(key).cloned())
    }

    async fn put(&self, key: K, val: CachedValue<V>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Put(key.clone(), val.clone()));
        if state.fail_puts {
            return Err(Error::Internal(format!("put refused for {:?}", key)));
        }
        state.entries.insert(key, val);
        Ok(())
    }

    async fn remove(&self, key: &K) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Remove(key.clone()));
        if state.failing_removes.contains(key) {
            return Err(Error::Internal(format!("remove refused for {:?}", key)));
        }
        Ok(state.entries.remove(key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Clear);
        if state.fail_clear {
            return Err(Error::Internal("clear refused".to_string()));
        }
        state.entries.clear();
        Ok(())
    }
}
