//! Speculative, best-effort prefetching into the shared cache
//!
//! Prefetching must never block rendering and never surface an error; a
//! skipped batch just degrades to on-demand loading.

use super::cache::ResourceCache;
use crate::api::ResourceFetcher;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub struct PrefetchScheduler {
    cache: Arc<Mutex<ResourceCache>>,
    fetcher: Arc<dyn ResourceFetcher>,
    /// Single-flight guard for range batches. Advisory: locality and
    /// foreground fetches run unguarded.
    range_in_flight: Arc<AtomicBool>,
}

/// Clears the range flag when dropped, whether the batch ran or not.
struct RangeGuard(Arc<AtomicBool>);

impl Drop for RangeGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PrefetchScheduler {
    pub fn new(cache: Arc<Mutex<ResourceCache>>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            range_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Warm a batch of keys. Keys already tracked by the cache are skipped;
    /// the rest are fetched concurrently, outcomes recorded, failures
    /// swallowed. A call while another range batch is in flight resolves
    /// immediately without fetching (dropped, not queued). The guard travels
    /// with the returned future, so dropping it unpolled still releases it.
    pub fn prefetch_range(&self, keys: Vec<String>) -> BoxFuture<'static, ()> {
        if self.range_in_flight.swap(true, Ordering::AcqRel) {
            return future::ready(()).boxed();
        }
        let guard = RangeGuard(self.range_in_flight.clone());
        let batch = self.spawn_batch(keys);
        async move {
            batch.await;
            drop(guard);
        }
        .boxed()
    }

    /// Warm the keys around the modal cursor. No single-flight guard; may
    /// run concurrently with a range batch.
    pub fn prefetch_adjacent(&self, keys: Vec<String>) -> BoxFuture<'static, ()> {
        self.spawn_batch(keys)
    }

    fn spawn_batch(&self, keys: Vec<String>) -> BoxFuture<'static, ()> {
        let pending: Vec<String> = {
            let mut cache = self.cache.lock().unwrap();
            let mut pending = Vec::new();
            for key in keys {
                if !cache.has(&key) {
                    cache.mark_pending(&key);
                    pending.push(key);
                }
            }
            pending
        };
        if pending.is_empty() {
            return future::ready(()).boxed();
        }
        debug!(count = pending.len(), "Prefetching batch");

        let fetches: Vec<_> = pending
            .into_iter()
            .map(|key| {
                let fetch = self.fetcher.fetch(&key);
                let cache = self.cache.clone();
                async move {
                    match fetch.await {
                        Ok(_) => {
                            let mut cache = cache.lock().unwrap();
                            cache.mark_loaded(&key);
                            cache.mark_preloaded(&key);
                        }
                        Err(e) => {
                            debug!(key = %key, error = %e, "Prefetch failed");
                            cache.lock().unwrap().mark_failed(&key);
                        }
                    }
                }
            })
            .collect();

        async move {
            future::join_all(fetches).await;
        }
        .boxed()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::super::cache::LoadStatus;
    use super::*;
    use crate::error::FetchError;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Test fetcher: counts fetches, fails configured keys, and can be
    /// stalled until released.
    pub(crate) struct MockFetcher {
        pub fetch_count: AtomicUsize,
        pub fail_keys: Mutex<HashSet<String>>,
        pub gate: Option<Arc<Notify>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self {
                fetch_count: AtomicUsize::new(0),
                fail_keys: Mutex::new(HashSet::new()),
                gate: None,
            }
        }

        pub fn failing(keys: &[&str]) -> Self {
            let mut f = Self::new();
            *f.fail_keys.lock().unwrap() =
                keys.iter().map(|k| k.to_string()).collect();
            f
        }

        pub fn gated(gate: Arc<Notify>) -> Self {
            let mut f = Self::new();
            f.gate = Some(gate);
            f
        }

        pub fn fetches(&self) -> usize {
            self.fetch_count.load(Ordering::SeqCst)
        }
    }

    impl ResourceFetcher for MockFetcher {
        fn fetch(&self, key: &str) -> BoxFuture<'static, Result<Vec<u8>, FetchError>> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail_keys.lock().unwrap().contains(key);
            let gate = self.gate.clone();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                if fail {
                    Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND))
                } else {
                    Ok(vec![0xff])
                }
            }
            .boxed()
        }
    }

    fn scheduler(fetcher: Arc<MockFetcher>) -> (PrefetchScheduler, Arc<Mutex<ResourceCache>>) {
        let cache = Arc::new(Mutex::new(ResourceCache::new()));
        (PrefetchScheduler::new(cache.clone(), fetcher), cache)
    }

    fn keys(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("key-{}", i)).collect()
    }

    #[tokio::test]
    async fn batch_records_outcomes_and_swallows_failures() {
        let fetcher = Arc::new(MockFetcher::failing(&["key-2"]));
        let (sched, cache) = scheduler(fetcher.clone());

        sched.prefetch_range(keys(0..4)).await;

        let cache = cache.lock().unwrap();
        assert_eq!(cache.status("key-0"), Some(LoadStatus::Loaded));
        assert!(cache.is_preloaded("key-0"));
        assert_eq!(cache.status("key-2"), Some(LoadStatus::Failed));
        assert!(!cache.is_preloaded("key-2"));
        assert_eq!(fetcher.fetches(), 4);
    }

    #[tokio::test]
    async fn rerunning_a_completed_range_refetches_nothing() {
        let fetcher = Arc::new(MockFetcher::new());
        let (sched, _cache) = scheduler(fetcher.clone());

        sched.prefetch_range(keys(0..10)).await;
        assert_eq!(fetcher.fetches(), 10);

        sched.prefetch_range(keys(0..10)).await;
        assert_eq!(fetcher.fetches(), 10);
    }

    #[tokio::test]
    async fn second_range_call_while_in_flight_is_dropped() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let (sched, cache) = scheduler(fetcher.clone());

        let first = tokio::spawn(sched.prefetch_range(keys(0..3)));
        tokio::task::yield_now().await;
        assert_eq!(fetcher.fetches(), 3);

        // Arrives mid-flight: resolves immediately, fetches nothing.
        sched.prefetch_range(keys(3..6)).await;
        assert_eq!(fetcher.fetches(), 3);
        assert!(!cache.lock().unwrap().has("key-3"));

        gate.notify_waiters();
        first.await.unwrap();
        assert_eq!(cache.lock().unwrap().status("key-0"), Some(LoadStatus::Loaded));

        // Guard released: a later range goes through.
        let after = tokio::spawn(sched.prefetch_range(keys(4..6)));
        assert_eq!(fetcher.fetches(), 5);
        tokio::task::yield_now().await;
        gate.notify_waiters();
        after.await.unwrap();
        assert!(cache.lock().unwrap().has("key-5"));
    }

    #[tokio::test]
    async fn dropping_an_unpolled_range_releases_the_guard() {
        let fetcher = Arc::new(MockFetcher::new());
        let (sched, cache) = scheduler(fetcher.clone());

        drop(sched.prefetch_range(keys(0..2)));

        sched.prefetch_range(keys(2..4)).await;
        assert_eq!(cache.lock().unwrap().status("key-2"), Some(LoadStatus::Loaded));
        assert_eq!(cache.lock().unwrap().status("key-3"), Some(LoadStatus::Loaded));
    }

    #[tokio::test]
    async fn adjacent_prefetch_runs_despite_range_guard() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let (sched, cache) = scheduler(fetcher.clone());

        let range = tokio::spawn(sched.prefetch_range(keys(0..2)));
        tokio::task::yield_now().await;

        let adjacent = tokio::spawn(sched.prefetch_adjacent(keys(10..12)));
        tokio::task::yield_now().await;
        // Both batches have issued fetches concurrently.
        assert_eq!(fetcher.fetches(), 4);

        gate.notify_waiters();
        tokio::task::yield_now().await;
        gate.notify_waiters();
        range.await.unwrap();
        adjacent.await.unwrap();
        assert!(cache.lock().unwrap().has("key-10"));
    }
}
