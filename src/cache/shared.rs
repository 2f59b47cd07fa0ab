//! Thread-safe wrapper around [`BoundedCache`].

use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::lru::BoundedCache;

/// A [`BoundedCache`] shared between concurrent requests.
///
/// The whole store sits behind one mutex; recency bookkeeping touches the
/// list on every hit so a read lock would not help. A poisoned lock is
/// recovered rather than propagated: the cache is best-effort and never
/// fails its callers.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    inner: Mutex<BoundedCache<K, V>>,
}

impl<K, V> SharedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(BoundedCache::new(capacity)),
        }
    }

    /// Clone out the value for `key`, promoting it on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Store `value` under `key`. Returns the evicted key, if any.
    pub fn insert(&self, key: K, value: V) -> Option<K> {
        self.lock().insert(key, value).map(|(evicted, _)| evicted)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    fn lock(&self) -> MutexGuard<'_, BoundedCache<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
