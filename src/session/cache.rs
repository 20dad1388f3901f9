//! Bounded key-status cache shared by the grid, prefetcher and modal
//!
//! Eviction is insertion-order FIFO, not LRU: the oldest-inserted entries go
//! first regardless of use. The policy lives entirely inside this type.

use crate::constants::{MAX_PRELOADED_KEYS, MAX_TRACKED_ENTRIES};
use std::collections::{HashMap, HashSet, VecDeque};

/// Outcome of a resource fetch, or Pending while one is outstanding.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed,
}

/// The single point of truth for "is resource X ready". Shared as
/// `Arc<Mutex<ResourceCache>>` across the session's components.
#[derive(Default)]
pub struct ResourceCache {
    statuses: HashMap<String, LoadStatus>,
    /// Keys in first-insertion order, oldest at the front.
    insertion: VecDeque<String>,
    preloaded: HashSet<String>,
    preload_order: VecDeque<String>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.statuses.contains_key(key)
    }

    pub fn status(&self, key: &str) -> Option<LoadStatus> {
        self.statuses.get(key).copied()
    }

    pub fn is_preloaded(&self, key: &str) -> bool {
        self.preloaded.contains(key)
    }

    pub fn mark_pending(&mut self, key: &str) {
        self.insert_or_update(key, LoadStatus::Pending);
    }

    pub fn mark_loaded(&mut self, key: &str) {
        self.insert_or_update(key, LoadStatus::Loaded);
    }

    pub fn mark_failed(&mut self, key: &str) {
        self.insert_or_update(key, LoadStatus::Failed);
    }

    /// Mark a key as warmed for display (bounded separately from statuses).
    pub fn mark_preloaded(&mut self, key: &str) {
        if self.preloaded.insert(key.to_string()) {
            self.preload_order.push_back(key.to_string());
        }
    }

    fn insert_or_update(&mut self, key: &str, status: LoadStatus) {
        if self.statuses.insert(key.to_string(), status).is_none() {
            self.insertion.push_back(key.to_string());
        }
        // Updates keep the original insertion position.
    }

    /// Drop the oldest-inserted entries beyond the capacity bounds. Runs on
    /// a fixed interval, not on access.
    pub fn evict_over_capacity(&mut self) {
        while self.insertion.len() > MAX_TRACKED_ENTRIES {
            if let Some(oldest) = self.insertion.pop_front() {
                self.statuses.remove(&oldest);
            }
        }
        while self.preload_order.len() > MAX_PRELOADED_KEYS {
            if let Some(oldest) = self.preload_order.pop_front() {
                self.preloaded.remove(&oldest);
            }
        }
    }

    pub fn tracked_len(&self) -> usize {
        self.statuses.len()
    }

    pub fn preloaded_len(&self) -> usize {
        self.preloaded.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_updates_do_not_duplicate_insertion_order() {
        let mut cache = ResourceCache::new();
        cache.mark_pending("a");
        cache.mark_loaded("a");
        assert_eq!(cache.status("a"), Some(LoadStatus::Loaded));
        assert_eq!(cache.insertion.len(), 1);
    }

    #[test]
    fn failed_keys_stay_recorded_so_rendering_short_circuits() {
        let mut cache = ResourceCache::new();
        cache.mark_failed("k");
        assert!(cache.has("k"));
        assert_eq!(cache.status("k"), Some(LoadStatus::Failed));
    }

    #[test]
    fn eviction_caps_statuses_and_drops_oldest_first() {
        let mut cache = ResourceCache::new();
        for i in 0..MAX_TRACKED_ENTRIES + 25 {
            cache.mark_loaded(&format!("key-{}", i));
        }
        cache.evict_over_capacity();
        assert_eq!(cache.tracked_len(), MAX_TRACKED_ENTRIES);
        // The 25 oldest are gone, the newest survive.
        assert!(!cache.has("key-0"));
        assert!(!cache.has("key-24"));
        assert!(cache.has("key-25"));
        assert!(cache.has(&format!("key-{}", MAX_TRACKED_ENTRIES + 24)));
    }

    #[test]
    fn eviction_caps_preloaded_independently() {
        let mut cache = ResourceCache::new();
        for i in 0..MAX_PRELOADED_KEYS + 10 {
            let key = format!("key-{}", i);
            cache.mark_loaded(&key);
            cache.mark_preloaded(&key);
        }
        cache.evict_over_capacity();
        assert_eq!(cache.preloaded_len(), MAX_PRELOADED_KEYS);
        assert!(!cache.is_preloaded("key-0"));
        assert!(cache.is_preloaded(&format!("key-{}", MAX_PRELOADED_KEYS + 9)));
        // Statuses are under their own (larger) bound and untouched here.
        assert_eq!(cache.tracked_len(), MAX_PRELOADED_KEYS + 10);
    }

    #[test]
    fn eviction_ignores_recency_of_use() {
        let mut cache = ResourceCache::new();
        for i in 0..MAX_TRACKED_ENTRIES + 1 {
            cache.mark_loaded(&format!("key-{}", i));
        }
        // Touch the oldest entry; FIFO still evicts it.
        cache.mark_loaded("key-0");
        cache.evict_over_capacity();
        assert!(!cache.has("key-0"));
    }
}
