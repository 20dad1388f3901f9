//! Display-side image loading
//!
//! Fetched bytes are decoded off the UI thread into `egui::ColorImage`s and
//! handed over through a shared map; the UI turns them into textures on
//! demand. The prefetch scheduler uses the same fetcher, so warmed keys are
//! already decoded by the time the grid or modal asks for them.

use super::App;
use crate::api::{ApiClient, ResourceFetcher};
use crate::error::FetchError;
use crate::session::LoadStatus;
use eframe::egui;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub(crate) type DecodedMap = Arc<Mutex<HashMap<String, egui::ColorImage>>>;

/// Fetcher that decodes every successfully fetched resource into the shared
/// decoded-image map. Replaced together with the session, so late
/// completions write into an orphaned map.
pub(crate) struct DisplayFetcher {
    api: Arc<ApiClient>,
    decoded: DecodedMap,
}

impl DisplayFetcher {
    pub fn new(api: Arc<ApiClient>, decoded: DecodedMap) -> Self {
        Self { api, decoded }
    }
}

fn decode(bytes: &[u8]) -> Result<egui::ColorImage, FetchError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    let pixels = img.into_raw();
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, &pixels))
}

impl ResourceFetcher for DisplayFetcher {
    fn fetch(&self, key: &str) -> BoxFuture<'static, Result<Vec<u8>, FetchError>> {
        let inner = self.api.fetch(key);
        let decoded = self.decoded.clone();
        let key = key.to_string();
        async move {
            let bytes = inner.await?;
            let img = decode(&bytes)?;
            decoded.lock().unwrap().insert(key, img);
            Ok(bytes)
        }
        .boxed()
    }
}

/// What the grid/modal can render for a key right now.
pub(crate) enum PhotoTexture {
    Ready(egui::TextureHandle),
    Loading,
    /// Fetch or decode failed; render the placeholder.
    Failed,
}

impl App {
    /// Resolve the texture for a key, spawning an on-demand fetch on a cold
    /// miss. Prefetched keys resolve from the decoded map without touching
    /// the network again.
    pub(crate) fn photo_texture(&mut self, ctx: &egui::Context, key: &str) -> PhotoTexture {
        if let Some(tex) = self.texture_cache.get(key) {
            return PhotoTexture::Ready(tex.clone());
        }

        let decoded = self.decoded.lock().unwrap().remove(key);
        if let Some(img) = decoded {
            let tex = ctx.load_texture(key, img, egui::TextureOptions::LINEAR);
            self.texture_cache.insert(key.to_string(), tex.clone());
            self.display_loading.remove(key);
            return PhotoTexture::Ready(tex);
        }

        let status = self
            .session
            .as_ref()
            .and_then(|s| s.cache.lock().unwrap().status(key));
        match status {
            Some(LoadStatus::Failed) => PhotoTexture::Failed,
            Some(LoadStatus::Pending) => PhotoTexture::Loading,
            _ => {
                self.spawn_display_fetch(ctx, key);
                PhotoTexture::Loading
            }
        }
    }

    fn spawn_display_fetch(&mut self, ctx: &egui::Context, key: &str) {
        if self.display_loading.contains(key) {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        self.display_loading.insert(key.to_string());

        let fetch = self.fetcher.fetch(key);
        let cache = session.cache.clone();
        let key = key.to_string();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            match fetch.await {
                Ok(_) => cache.lock().unwrap().mark_loaded(&key),
                Err(e) => {
                    debug!(key = %key, error = %e, "Display fetch failed");
                    cache.lock().unwrap().mark_failed(&key);
                }
            }
            ctx.request_repaint();
        });
    }
}
