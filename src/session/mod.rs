//! Per-search session state
//!
//! One `Session` owns everything derived from a search response: the result
//! index, the visibility window, the shared resource cache, favorites and
//! selection, the prefetch scheduler and the modal navigator. The app holds
//! an `Option<Session>` and replaces it wholesale on reset or a new search;
//! in-flight fetches finish against the old cache allocation, which nothing
//! reads anymore.

mod cache;
mod modal;
mod prefetch;
mod results;
mod window;

pub use cache::{LoadStatus, ResourceCache};
pub use modal::ModalNavigator;
pub use prefetch::PrefetchScheduler;
pub use results::{PhotoMatch, ResultSet};
pub use window::{ScrollDecision, ScrollMetrics, VisibilityWindow};

use crate::api::ResourceFetcher;
use crate::constants::{CACHE_SWEEP_INTERVAL_SECS, MODAL_PREFETCH_RADIUS, PREFETCH_BATCH};
use crate::types::RawMatch;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Session {
    pub results: ResultSet,
    pub window: VisibilityWindow,
    pub cache: Arc<Mutex<ResourceCache>>,
    pub scheduler: PrefetchScheduler,
    pub modal: ModalNavigator,
    /// Keys marked favorite; lives and dies with the session.
    pub favorites: HashSet<String>,
    pub selection_mode: bool,
    pub selected: HashSet<String>,
    sweeper: CancellationToken,
}

impl Session {
    /// Build the session for one successful search and start the periodic
    /// cache eviction sweep on the given runtime.
    pub fn new(
        raw: Vec<RawMatch>,
        fetcher: Arc<dyn ResourceFetcher>,
        runtime: &tokio::runtime::Handle,
    ) -> Self {
        let results = ResultSet::build(raw);
        let window = VisibilityWindow::new(results.len());
        let cache = Arc::new(Mutex::new(ResourceCache::new()));
        let scheduler = PrefetchScheduler::new(cache.clone(), fetcher);

        info!(matches = results.len(), "Session created");

        let sweeper = CancellationToken::new();
        {
            let cache = cache.clone();
            let token = sweeper.clone();
            runtime.spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(CACHE_SWEEP_INTERVAL_SECS));
                interval.tick().await; // first tick fires immediately
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = interval.tick() => {
                            cache.lock().unwrap().evict_over_capacity();
                        }
                    }
                }
            });
        }

        Self {
            results,
            window,
            cache,
            scheduler,
            modal: ModalNavigator::default(),
            favorites: HashSet::new(),
            selection_mode: false,
            selected: HashSet::new(),
            sweeper,
        }
    }

    /// Keys of the next prefetch batch starting at `start`.
    pub fn prefetch_keys(&self, start: usize) -> Vec<String> {
        self.results.keys_from(start, PREFETCH_BATCH)
    }

    /// Keys around the modal cursor for locality prefetch.
    pub fn locality_keys(&self, index: usize) -> Vec<String> {
        self.results.adjacent_keys(index, MODAL_PREFETCH_RADIUS)
    }

    pub fn toggle_favorite(&mut self, key: &str) {
        if !self.favorites.remove(key) {
            self.favorites.insert(key.to_string());
        }
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.favorites.contains(key)
    }

    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
        if !self.selection_mode {
            self.selected.clear();
        }
    }

    pub fn toggle_selected(&mut self, key: &str) {
        if !self.selected.remove(key) {
            self.selected.insert(key.to_string());
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Stop the sweeper so it does not keep the old cache alive.
        self.sweeper.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::prefetch::tests::MockFetcher;
    use super::*;

    fn raw_set(count: usize) -> Vec<RawMatch> {
        (1..=count)
            .map(|i| RawMatch {
                image_path: format!(r"d:\event\photos\guest ({}).jpg", i),
                similarity: 0.9,
            })
            .collect()
    }

    #[tokio::test]
    async fn opening_modal_at_ten_prefetches_the_radius_two_neighbourhood() {
        let fetcher = Arc::new(MockFetcher::new());
        let session = Session::new(
            raw_set(20),
            fetcher.clone(),
            &tokio::runtime::Handle::current(),
        );

        let key = session.results.get(10).unwrap().key.clone();
        let opened = session
            .modal
            .open(10, key, session.cache.clone(), fetcher.clone())
            .await;
        assert!(opened);
        assert_eq!(session.modal.cursor(), Some(10));

        session
            .scheduler
            .prefetch_adjacent(session.locality_keys(10))
            .await;

        let cache = session.cache.lock().unwrap();
        // Indices 10 (foreground) plus 8, 9, 11, 12 (locality).
        for i in [8usize, 9, 10, 11, 12] {
            let key = &session.results.get(i).unwrap().key;
            assert_eq!(cache.status(key), Some(LoadStatus::Loaded), "index {}", i);
        }
        assert_eq!(fetcher.fetches(), 5);
    }

    #[tokio::test]
    async fn favorites_and_selection_are_session_scoped() {
        let fetcher = Arc::new(MockFetcher::new());
        let mut session = Session::new(
            raw_set(3),
            fetcher.clone(),
            &tokio::runtime::Handle::current(),
        );
        session.toggle_favorite("guest (1).jpg");
        assert!(session.is_favorite("guest (1).jpg"));
        session.toggle_favorite("guest (1).jpg");
        assert!(!session.is_favorite("guest (1).jpg"));

        session.toggle_selection_mode();
        session.toggle_selected("guest (2).jpg");
        assert!(session.selected.contains("guest (2).jpg"));
        session.toggle_selection_mode();
        assert!(session.selected.is_empty());

        // Replacing the session drops all of it together.
        let replacement = Session::new(
            raw_set(1),
            fetcher,
            &tokio::runtime::Handle::current(),
        );
        drop(session);
        assert!(replacement.favorites.is_empty());
    }
}
