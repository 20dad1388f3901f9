//! Cursor over the result set for the single-image viewer

use super::cache::ResourceCache;
use crate::api::ResourceFetcher;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Default)]
struct ModalState {
    /// Index into the result set; None while the modal is closed.
    cursor: Option<usize>,
    loading: bool,
}

/// Navigator for the enlarged single-image view. Cursor updates on a cache
/// miss are deferred until the fetch outcome is known, so the UI never
/// shows a new index over stale content.
#[derive(Clone, Default)]
pub struct ModalNavigator {
    state: Arc<Mutex<ModalState>>,
}

impl ModalNavigator {
    pub fn cursor(&self) -> Option<usize> {
        self.state.lock().unwrap().cursor
    }

    pub fn is_open(&self) -> bool {
        self.cursor().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().loading
    }

    /// Open the modal at `index`. On a cache hit (any recorded status) the
    /// cursor moves immediately; on a miss a foreground fetch runs, the
    /// cache is updated, and only then does the cursor commit. The returned
    /// future resolves to whether locality prefetch should follow (hit, or
    /// fetch success).
    pub fn open(
        &self,
        index: usize,
        key: String,
        cache: Arc<Mutex<ResourceCache>>,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> BoxFuture<'static, bool> {
        if cache.lock().unwrap().has(&key) {
            let mut state = self.state.lock().unwrap();
            state.cursor = Some(index);
            state.loading = false;
            return future::ready(true).boxed();
        }

        {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            if state.cursor.is_none() {
                // First open has nothing older to keep showing.
                state.cursor = Some(index);
            }
        }
        cache.lock().unwrap().mark_pending(&key);

        let fetch = fetcher.fetch(&key);
        let state = self.state.clone();
        async move {
            let ok = match fetch.await {
                Ok(_) => {
                    cache.lock().unwrap().mark_loaded(&key);
                    true
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "Modal fetch failed");
                    cache.lock().unwrap().mark_failed(&key);
                    false
                }
            };
            let mut state = state.lock().unwrap();
            state.cursor = Some(index);
            state.loading = false;
            ok
        }
        .boxed()
    }

    /// Step the cursor by `direction`. Out-of-bounds targets and calls while
    /// the modal is closed or loading are no-ops (None). Otherwise behaves
    /// like `open` at the new index.
    pub fn move_by(
        &self,
        direction: isize,
        len: usize,
        key_at: impl FnOnce(usize) -> Option<String>,
        cache: Arc<Mutex<ResourceCache>>,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Option<(usize, BoxFuture<'static, bool>)> {
        let cursor = {
            let state = self.state.lock().unwrap();
            if state.loading {
                return None;
            }
            state.cursor?
        };
        let new_index = cursor.checked_add_signed(direction)?;
        if new_index >= len {
            return None;
        }
        let key = key_at(new_index)?;
        Some((new_index, self.open(new_index, key, cache, fetcher)))
    }

    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.cursor = None;
        state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::super::cache::LoadStatus;
    use super::super::prefetch::tests::MockFetcher;
    use super::*;
    use tokio::sync::Notify;

    fn cache() -> Arc<Mutex<ResourceCache>> {
        Arc::new(Mutex::new(ResourceCache::new()))
    }

    #[tokio::test]
    async fn open_on_miss_shows_loading_then_commits() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let cache = cache();
        let modal = ModalNavigator::default();

        let open = tokio::spawn(modal.open(10, "k10".into(), cache.clone(), fetcher.clone()));
        tokio::task::yield_now().await;
        assert!(modal.is_loading());
        assert_eq!(cache.lock().unwrap().status("k10"), Some(LoadStatus::Pending));

        gate.notify_waiters();
        assert!(open.await.unwrap());
        assert_eq!(modal.cursor(), Some(10));
        assert!(!modal.is_loading());
        assert_eq!(cache.lock().unwrap().status("k10"), Some(LoadStatus::Loaded));
    }

    #[tokio::test]
    async fn open_on_hit_commits_immediately() {
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache();
        cache.lock().unwrap().mark_loaded("k3");
        let modal = ModalNavigator::default();

        assert!(modal.open(3, "k3".into(), cache, fetcher.clone()).await);
        assert_eq!(modal.cursor(), Some(3));
        assert_eq!(fetcher.fetches(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_records_failure_but_still_navigates() {
        let fetcher = Arc::new(MockFetcher::failing(&["bad"]));
        let cache = cache();
        let modal = ModalNavigator::default();

        let ok = modal.open(5, "bad".into(), cache.clone(), fetcher).await;
        assert!(!ok);
        assert_eq!(modal.cursor(), Some(5));
        assert_eq!(cache.lock().unwrap().status("bad"), Some(LoadStatus::Failed));
    }

    #[tokio::test]
    async fn reopening_a_failed_key_does_not_refetch() {
        let fetcher = Arc::new(MockFetcher::failing(&["bad"]));
        let cache = cache();
        let modal = ModalNavigator::default();

        modal.open(2, "bad".into(), cache.clone(), fetcher.clone()).await;
        assert_eq!(fetcher.fetches(), 1);

        // The recorded failure is a cache hit; the viewer shows the
        // placeholder without hitting the network again.
        modal.close();
        assert!(modal.open(2, "bad".into(), cache.clone(), fetcher.clone()).await);
        assert_eq!(modal.cursor(), Some(2));
        assert_eq!(fetcher.fetches(), 1);
        assert_eq!(cache.lock().unwrap().status("bad"), Some(LoadStatus::Failed));
    }

    #[tokio::test]
    async fn move_past_the_ends_is_a_noop() {
        let fetcher: Arc<MockFetcher> = Arc::new(MockFetcher::new());
        let cache = cache();
        cache.lock().unwrap().mark_loaded("k4");
        let modal = ModalNavigator::default();
        modal.open(4, "k4".into(), cache.clone(), fetcher.clone()).await;

        // len = 5, cursor at the last index.
        let step = modal.move_by(1, 5, |_| Some("k5".into()), cache.clone(), fetcher.clone());
        assert!(step.is_none());
        assert_eq!(modal.cursor(), Some(4));

        modal.close();
        modal.open(0, "k4".into(), cache.clone(), fetcher.clone()).await;
        let step = modal.move_by(-1, 5, |_| Some("k-".into()), cache, fetcher);
        assert!(step.is_none());
        assert_eq!(modal.cursor(), Some(0));
    }

    #[tokio::test]
    async fn move_defers_cursor_until_outcome_known() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::gated(gate.clone()));
        let cache = cache();
        cache.lock().unwrap().mark_loaded("k1");
        let modal = ModalNavigator::default();
        modal.open(1, "k1".into(), cache.clone(), fetcher.clone()).await;

        let (new_index, fut) = modal
            .move_by(1, 10, |i| Some(format!("k{}", i)), cache.clone(), fetcher.clone())
            .unwrap();
        assert_eq!(new_index, 2);
        let step = tokio::spawn(fut);
        tokio::task::yield_now().await;
        // Old cursor holds while the target fetch is in flight.
        assert_eq!(modal.cursor(), Some(1));
        assert!(modal.is_loading());

        // Further moves while loading are dropped.
        assert!(modal
            .move_by(1, 10, |i| Some(format!("k{}", i)), cache.clone(), fetcher.clone())
            .is_none());

        gate.notify_waiters();
        assert!(step.await.unwrap());
        assert_eq!(modal.cursor(), Some(2));
        assert!(!modal.is_loading());
    }

    #[tokio::test]
    async fn close_clears_cursor_and_loading() {
        let fetcher = Arc::new(MockFetcher::new());
        let cache = cache();
        cache.lock().unwrap().mark_loaded("k0");
        let modal = ModalNavigator::default();
        modal.open(0, "k0".into(), cache, fetcher).await;
        modal.close();
        assert!(!modal.is_open());
        assert!(!modal.is_loading());
    }
}
