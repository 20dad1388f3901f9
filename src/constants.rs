//! Application constants and configuration

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default similarity threshold sent with search requests.
pub const SEARCH_THRESHOLD: f32 = 0.6;

// Visibility window (virtual scroll)
pub const INITIAL_VISIBLE_COUNT: usize = 20;
pub const VISIBLE_STEP: usize = 20;
/// Settle delay before a requested "load more" actually advances the window.
pub const LOAD_MORE_SETTLE_MS: u64 = 300;
/// Unscrolled remainder below which the window advances.
pub const NEAR_BOTTOM_PX: f32 = 100.0;

// Prefetch
pub const PREFETCH_BATCH: usize = 10;
/// Fraction of scrollable height past which the next batch is warmed.
pub const PREFETCH_SCROLL_FRACTION: f32 = 0.8;
/// Delay after a successful search before the first batch is warmed,
/// letting the initial render happen first.
pub const INITIAL_PREFETCH_DELAY_MS: u64 = 500;
/// Keys prefetched on each side of the modal cursor.
pub const MODAL_PREFETCH_RADIUS: usize = 2;

// Resource cache bounds
pub const MAX_TRACKED_ENTRIES: usize = 100;
pub const MAX_PRELOADED_KEYS: usize = 50;
/// Interval of the eviction sweep, independent of access patterns.
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 30;
