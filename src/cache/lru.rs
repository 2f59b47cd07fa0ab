//! Fixed-capacity least-recently-used store.
//!
//! # Responsibilities
//! - O(1) lookup, insert and promotion
//! - Never hold more than `capacity` entries
//! - Evict the least-recently-used entry when a new key arrives at capacity
//!
//! Slots live in a `Vec` and are linked into a doubly linked recency list by
//! index. Slots are reused in place on eviction, so the arena never shrinks
//! and never holds holes.

use std::collections::HashMap;
use std::hash::Hash;

/// Sentinel index for "no slot".
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    /// Towards the most-recently-used end.
    prev: usize,
    /// Towards the least-recently-used end.
    next: usize,
}

/// A bounded key/value store with least-recently-used eviction.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    /// Most recently used slot.
    head: usize,
    /// Least recently used slot.
    tail: usize,
    capacity: usize,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.promote(idx);
        Some(&self.slots[idx].value)
    }

    /// Check for `key` without touching recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace `key`, marking it most-recently-used.
    ///
    /// Returns the evicted entry when a new key had to displace the
    /// least-recently-used one.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.slots[idx].value = value;
            self.promote(idx);
            return None;
        }

        if self.slots.len() < self.capacity {
            let idx = self.slots.len();
            self.slots.push(Slot {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.index.insert(key, idx);
            self.push_front(idx);
            return None;
        }

        // Full: recycle the tail slot for the new key.
        let idx = self.tail;
        self.unlink(idx);
        let slot = &mut self.slots[idx];
        let old_key = std::mem::replace(&mut slot.key, key.clone());
        let old_value = std::mem::replace(&mut slot.value, value);
        self.index.remove(&old_key);
        self.index.insert(key, idx);
        self.push_front(idx);
        Some((old_key, old_value))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            if cursor == NIL {
                return None;
            }
            let slot = &self.slots[cursor];
            cursor = slot.next;
            Some(&slot.key)
        })
    }

    fn promote(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = &self.slots[idx];
            (slot.prev, slot.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }

        let slot = &mut self.slots[idx];
        slot.prev = NIL;
        slot.next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let slot = &mut self.slots[idx];
            slot.prev = NIL;
            slot.next = old_head;
        }
        if old_head != NIL {
            self.slots[old_head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize) -> BoundedCache<String, usize> {
        let mut cache = BoundedCache::new(capacity);
        for i in 0..capacity {
            cache.insert(format!("k{}", i), i);
        }
        cache
    }

    #[test]
    fn test_evicts_first_inserted_when_over_capacity() {
        let mut cache = filled(3);
        let evicted = cache.insert("k3".to_string(), 3);

        assert_eq!(evicted, Some(("k0".to_string(), 0)));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key(&"k0".to_string()));
        assert!(cache.contains_key(&"k3".to_string()));
    }

    #[test]
    fn test_get_promotes_key() {
        let mut cache = filled(3);
        assert_eq!(cache.get(&"k0".to_string()), Some(&0));

        cache.insert("k3".to_string(), 3);

        assert!(cache.contains_key(&"k0".to_string()));
        assert!(!cache.contains_key(&"k1".to_string()));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_overwrite_replaces_value_and_promotes() {
        let mut cache = filled(2);
        assert!(cache.insert("k0".to_string(), 42).is_none());
        assert_eq!(cache.len(), 2);

        // k1 is now the oldest.
        cache.insert("k2".to_string(), 2);
        assert_eq!(cache.get(&"k0".to_string()), Some(&42));
        assert!(!cache.contains_key(&"k1".to_string()));
    }

    #[test]
    fn test_recency_order() {
        let mut cache = filled(4);
        cache.get(&"k1".to_string());
        cache.get(&"k3".to_string());

        let order: Vec<&String> = cache.keys().collect();
        assert_eq!(order, vec!["k3", "k1", "k2", "k0"]);
    }

    #[test]
    fn test_single_slot_cache() {
        let mut cache = BoundedCache::new(1);
        cache.insert("a", 1);
        cache.insert("b", 2);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = BoundedCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(1, "one");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_bound_holds_under_churn() {
        let mut cache = BoundedCache::new(16);
        for i in 0..1_000u32 {
            cache.insert(i % 37, i);
            if i % 3 == 0 {
                cache.get(&(i % 11));
            }
            assert!(cache.len() <= 16);
        }
        assert_eq!(cache.keys().count(), cache.len());
    }
}
