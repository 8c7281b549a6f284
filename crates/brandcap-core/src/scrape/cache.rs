//! In-memory time-limited cache for website analyses.
//!
//! Entries expire after a fixed TTL. When full, the oldest entry is evicted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// A small TTL cache keyed by string.
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Get a fresh value, dropping it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = self.entries.get(key)?.inserted_at.elapsed() > self.ttl;
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        self.purge_expired();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!("Evicting cached analysis for {oldest}");
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.inserted_at.elapsed() <= ttl);
    }
}
