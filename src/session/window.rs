//! Visibility window for the gallery's virtual scroll

use crate::constants::{
    INITIAL_VISIBLE_COUNT, LOAD_MORE_SETTLE_MS, NEAR_BOTTOM_PX, PREFETCH_SCROLL_FRACTION,
    VISIBLE_STEP,
};
use std::time::{Duration, Instant};

/// Scroll geometry of the gallery, as reported by the scroll area each frame.
#[derive(Clone, Copy)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

impl ScrollMetrics {
    fn near_bottom(&self) -> bool {
        self.offset + self.viewport_height >= self.content_height - NEAR_BOTTOM_PX
    }

    fn fraction(&self) -> f32 {
        if self.content_height <= 0.0 {
            0.0
        } else {
            (self.offset + self.viewport_height) / self.content_height
        }
    }
}

/// What a scroll event asks for, decided synchronously from the metrics.
#[derive(Default)]
pub struct ScrollDecision {
    /// An advance was requested (it completes after the settle delay).
    pub load_more: bool,
    /// Start index of a prefetch batch to schedule, if any.
    pub prefetch_from: Option<usize>,
}

/// The prefix of the result set currently rendered. Monotonically grows
/// within one session; a new search builds a fresh window.
pub struct VisibilityWindow {
    visible: usize,
    total: usize,
    /// Set while a "load more" is settling; blocks overlapping advances.
    loading_since: Option<Instant>,
}

impl VisibilityWindow {
    pub fn new(total: usize) -> Self {
        Self {
            visible: INITIAL_VISIBLE_COUNT.min(total),
            total,
            loading_since: None,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.visible >= self.total
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_since.is_some()
    }

    /// Ask for one more step. No-op while a previous request is settling or
    /// once the window covers the whole result set. Returns whether the
    /// request was accepted.
    pub fn request_advance(&mut self, now: Instant) -> bool {
        if self.loading_since.is_some() || self.is_exhausted() {
            return false;
        }
        self.loading_since = Some(now);
        true
    }

    /// Complete a pending advance once the settle delay has passed. Called
    /// every frame; returns the new count when the window actually grew.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let since = self.loading_since?;
        if now.duration_since(since) < Duration::from_millis(LOAD_MORE_SETTLE_MS) {
            return None;
        }
        self.loading_since = None;
        self.visible = (self.visible + VISIBLE_STEP).min(self.total);
        Some(self.visible)
    }

    /// Decide what a scroll position asks for: a window advance near the
    /// bottom, a prefetch batch past the 80% mark. Both only while the
    /// window is not exhausted.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> ScrollDecision {
        let mut decision = ScrollDecision::default();
        if self.is_exhausted() {
            return decision;
        }
        if metrics.near_bottom() {
            decision.load_more = self.request_advance(now);
        }
        if metrics.fraction() > PREFETCH_SCROLL_FRACTION {
            decision.prefetch_from = Some(self.visible);
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(now: Instant) -> Instant {
        now + Duration::from_millis(LOAD_MORE_SETTLE_MS + 1)
    }

    fn bottom_metrics() -> ScrollMetrics {
        ScrollMetrics {
            offset: 900.0,
            viewport_height: 100.0,
            content_height: 1000.0,
        }
    }

    #[test]
    fn starts_clamped_to_small_result_sets() {
        let w = VisibilityWindow::new(5);
        assert_eq!(w.visible_count(), 5);
        assert!(w.is_exhausted());
    }

    #[test]
    fn advance_never_exceeds_total_and_is_noop_after_exhaustion() {
        let mut w = VisibilityWindow::new(45);
        let t0 = Instant::now();

        assert!(w.request_advance(t0));
        assert_eq!(w.tick(settled(t0)), Some(40));

        let t1 = settled(t0);
        assert!(w.request_advance(t1));
        assert_eq!(w.tick(settled(t1)), Some(45));
        assert!(w.is_exhausted());

        assert!(!w.request_advance(settled(t1)));
        assert_eq!(w.visible_count(), 45);
    }

    #[test]
    fn overlapping_requests_from_one_scroll_burst_collapse() {
        let mut w = VisibilityWindow::new(100);
        let t0 = Instant::now();
        assert!(w.request_advance(t0));
        // Burst of repeat triggers while settling: all dropped.
        assert!(!w.request_advance(t0 + Duration::from_millis(50)));
        assert!(!w.request_advance(t0 + Duration::from_millis(100)));
        assert!(w.tick(t0 + Duration::from_millis(100)).is_none());
        assert_eq!(w.tick(settled(t0)), Some(40));
        assert!(!w.is_loading_more());
    }

    #[test]
    fn scroll_to_bottom_advances_exactly_once_per_hit() {
        // Scenario from the design notes: 45 items, two bottom hits.
        let mut w = VisibilityWindow::new(45);
        let t0 = Instant::now();

        let d = w.on_scroll(bottom_metrics(), t0);
        assert!(d.load_more);
        assert_eq!(w.tick(settled(t0)), Some(40));

        let t1 = settled(t0);
        let d = w.on_scroll(bottom_metrics(), t1);
        assert!(d.load_more);
        assert_eq!(w.tick(settled(t1)), Some(45));

        let d = w.on_scroll(bottom_metrics(), settled(t1));
        assert!(!d.load_more);
        assert!(d.prefetch_from.is_none());
    }

    #[test]
    fn prefetch_arms_past_the_eighty_percent_mark() {
        let mut w = VisibilityWindow::new(100);
        let now = Instant::now();

        let high = ScrollMetrics {
            offset: 750.0,
            viewport_height: 100.0,
            content_height: 1000.0,
        };
        let d = w.on_scroll(high, now);
        assert_eq!(d.prefetch_from, Some(20));
        assert!(!d.load_more);

        let low = ScrollMetrics {
            offset: 100.0,
            viewport_height: 100.0,
            content_height: 1000.0,
        };
        let d = w.on_scroll(low, now);
        assert!(d.prefetch_from.is_none());
    }
}
