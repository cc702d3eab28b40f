//! Bounded, thread-safe memo table with first-in-first-out eviction.

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Counters of one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that missed.
    pub misses: u64,
    /// Entries dropped to honour the capacity.
    pub evictions: u64,
    /// Entries currently held.
    pub len: usize,
    /// Maximum entries (`0` = unbounded).
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Inner<K, V> {
    map: HashMap<K, V>,
    fifo: VecDeque<K>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Memo table shared across threads.
///
/// Re-inserting an existing key overwrites its value without changing its
/// eviction position, so concurrent redundant computation of one key is
/// harmless.
#[derive(Debug)]
pub struct FifoCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> FifoCache<K, V> {
    /// Creates a cache holding at most `capacity` entries (`0` = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                fifo: VecDeque::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            capacity,
        }
    }

    /// Looks up a key, counting the hit or miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        match inner.map.get(key).cloned() {
            Some(v) => {
                inner.hits += 1;
                Some(v)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Stores a value, evicting the oldest entries beyond capacity.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.map.get_mut(&key) {
            *slot = value;
            return;
        }
        inner.fifo.push_back(key.clone());
        inner.map.insert(key, value);
        while self.capacity > 0 && inner.map.len() > self.capacity {
            let Some(oldest) = inner.fifo.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
            inner.evictions += 1;
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        inner.fifo.clear();
        inner.hits = 0;
        inner.misses = 0;
        inner.evictions = 0;
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            len: inner.map.len(),
            capacity: self.capacity,
        }
    }
}
