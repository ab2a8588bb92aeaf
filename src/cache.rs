//! Per-instance TTL cache
//!
//! Entries expire a fixed time after insertion and are never invalidated
//! otherwise. Each read or write touches one shard under a single
//! non-suspending critical section, so concurrent tasks cannot observe a
//! half-written entry.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Cached value with its insertion time
#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<V> {
    entries: DashMap<String, CachedEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh entry. Expired entries are dropped on access.
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.insert(
            key.into(),
            CachedEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, including any not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
