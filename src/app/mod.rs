//! App module - contains the main application state and logic

mod downloads;
mod modals;
mod textures;
mod views;

use crate::api::{ApiClient, ResourceFetcher};
use crate::constants::INITIAL_PREFETCH_DELAY_MS;
use crate::error::SearchError;
use crate::session::Session;
use crate::settings::Settings;
use crate::theme;
use crate::types::{DownloadState, RawMatch, Step};
use eframe::egui;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) api: Arc<ApiClient>,
    /// Fetcher shared with the session's scheduler/modal; replaced together
    /// with the session so decoded images land in the current map.
    pub(crate) fetcher: Arc<dyn ResourceFetcher>,
    pub(crate) session: Option<Session>,
    pub(crate) step: Step,
    pub(crate) uploaded_image: Option<PathBuf>,
    pub(crate) error_message: Option<String>,
    pub(crate) pending_search: Arc<Mutex<Option<Result<Vec<RawMatch>, SearchError>>>>,
    // Display-side image pipeline
    pub(crate) decoded: textures::DecodedMap,
    pub(crate) texture_cache: HashMap<String, egui::TextureHandle>,
    pub(crate) display_loading: HashSet<String>,
    // Grid scroll state
    pub(crate) grid_offset: f32,
    /// Item index the grid should scroll back to (set when the modal closes).
    pub(crate) grid_scroll_sync: Option<usize>,
    // Download state
    pub(crate) download_state: Arc<Mutex<DownloadState>>,
    pub(crate) show_download_modal: bool,
    pub(crate) cancel_token: Option<CancellationToken>,
    pub(crate) download_path: PathBuf,
    pub(crate) search_threshold: f32,
    // Settings / window
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    /// Toast text posted from background tasks, picked up each frame.
    pub(crate) pending_toast: Arc<Mutex<Option<String>>>,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, data_dir: PathBuf) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let api = Arc::new(ApiClient::new(settings.api_url.clone()));
        let decoded: textures::DecodedMap = Arc::new(Mutex::new(HashMap::new()));
        let fetcher: Arc<dyn ResourceFetcher> =
            Arc::new(textures::DisplayFetcher::new(api.clone(), decoded.clone()));
        let download_path = settings.download_path_or_default();

        Self {
            runtime: tokio::runtime::Runtime::new().unwrap(),
            api,
            fetcher,
            session: None,
            step: Step::Upload,
            uploaded_image: None,
            error_message: None,
            pending_search: Arc::new(Mutex::new(None)),
            decoded,
            texture_cache: HashMap::new(),
            display_loading: HashSet::new(),
            grid_offset: 0.0,
            grid_scroll_sync: None,
            download_state: Arc::new(Mutex::new(DownloadState::default())),
            show_download_modal: false,
            cancel_token: None,
            download_path,
            search_threshold: settings.search_threshold,
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
            toast_message: None,
            toast_start: None,
            pending_toast: Arc::new(Mutex::new(None)),
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            api_url: self.api.base_url().to_string(),
            search_threshold: self.search_threshold,
            download_path: Some(self.download_path.to_string_lossy().to_string()),
        };
        settings.save(&self.data_dir);
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_start = Some(std::time::Instant::now());
    }

    // ------------------------------------------------------------------
    // Search lifecycle
    // ------------------------------------------------------------------

    /// Kick off the face search for the uploaded image.
    pub fn start_search(&mut self, ctx: &egui::Context) {
        let Some(path) = self.uploaded_image.clone() else {
            return;
        };
        self.step = Step::Searching;
        self.error_message = None;

        let api = self.api.clone();
        let slot = self.pending_search.clone();
        let threshold = self.search_threshold;
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = api.search(&path, threshold).await;
            *slot.lock().unwrap() = Some(result);
            ctx.request_repaint();
        });
    }

    /// Poll the in-flight search; on success build a fresh session (replacing
    /// all per-search state atomically) and schedule the initial prefetch.
    pub fn poll_search(&mut self, ctx: &egui::Context) {
        let Some(result) = self.pending_search.lock().unwrap().take() else {
            return;
        };
        match result {
            Ok(matches) => {
                // New decoded map + fetcher first, so the session's scheduler
                // and any stale completions target different allocations.
                self.decoded = Arc::new(Mutex::new(HashMap::new()));
                self.fetcher = Arc::new(textures::DisplayFetcher::new(
                    self.api.clone(),
                    self.decoded.clone(),
                ));
                self.texture_cache.clear();
                self.display_loading.clear();
                self.grid_offset = 0.0;

                let session = Session::new(matches, self.fetcher.clone(), self.runtime.handle());

                // Warm the first batch once the initial render has happened.
                let scheduler = session.scheduler.clone();
                let keys = session.prefetch_keys(0);
                let ctx = ctx.clone();
                self.runtime.spawn(async move {
                    tokio::time::sleep(Duration::from_millis(INITIAL_PREFETCH_DELAY_MS)).await;
                    scheduler.prefetch_range(keys).await;
                    ctx.request_repaint();
                });

                self.session = Some(session);
                self.step = Step::Results;
            }
            Err(e) => {
                self.error_message = Some(e.user_message());
                self.step = Step::Upload;
            }
        }
    }

    /// Back to the upload screen; drops the whole session (results, window,
    /// cache, favorites, modal) in one go.
    pub fn reset_search(&mut self) {
        info!("Resetting search session");
        self.session = None;
        self.uploaded_image = None;
        self.error_message = None;
        self.texture_cache.clear();
        self.display_loading.clear();
        self.decoded.lock().unwrap().clear();
        self.grid_offset = 0.0;
        self.grid_scroll_sync = None;
        self.step = Step::Upload;
    }

    // ------------------------------------------------------------------
    // Modal navigation
    // ------------------------------------------------------------------

    pub fn open_modal(&mut self, ctx: &egui::Context, index: usize) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(photo) = session.results.get(index) else {
            return;
        };
        let fut = session.modal.open(
            index,
            photo.key.clone(),
            session.cache.clone(),
            self.fetcher.clone(),
        );
        self.spawn_with_locality(ctx, index, fut);
    }

    pub fn modal_move(&mut self, ctx: &egui::Context, direction: isize) {
        let Some(session) = &self.session else {
            return;
        };
        let results = &session.results;
        let step = session.modal.move_by(
            direction,
            results.len(),
            |i| results.get(i).map(|p| p.key.clone()),
            session.cache.clone(),
            self.fetcher.clone(),
        );
        if let Some((new_index, fut)) = step {
            self.spawn_with_locality(ctx, new_index, fut);
        }
    }

    /// Drive the open/move future and, when it lands, prefetch the radius-2
    /// neighbourhood of the new cursor.
    fn spawn_with_locality(
        &self,
        ctx: &egui::Context,
        index: usize,
        fut: futures::future::BoxFuture<'static, bool>,
    ) {
        let Some(session) = &self.session else {
            return;
        };
        let scheduler = session.scheduler.clone();
        let keys = session.locality_keys(index);
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            if fut.await {
                ctx.request_repaint();
                scheduler.prefetch_adjacent(keys).await;
            }
            ctx.request_repaint();
        });
    }

    /// Close the modal, scrolling the grid back to the cursor's row first.
    pub fn close_modal(&mut self) {
        if let Some(session) = &self.session {
            self.grid_scroll_sync = session.modal.cursor();
            session.modal.close();
        }
    }
}
