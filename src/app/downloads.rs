//! Download logic: ZIP archives of many photos and single-photo saves

use super::App;
use crate::api::ApiClient;
use crate::types::{DownloadState, DownloadStatus};
use eframe::egui;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Stream a response body into memory and write it to `dest`, tracking
/// progress in the shared state. Cancellation aborts mid-stream; nothing
/// touches disk until the stream completes.
async fn stream_to_file(
    response: reqwest::Response,
    dest: PathBuf,
    state: Arc<Mutex<DownloadState>>,
    ctx: &egui::Context,
    token: &CancellationToken,
) {
    let total_size = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut bytes_vec = Vec::with_capacity(total_size as usize);
    let mut stream = response.bytes_stream();
    let mut last_repaint = std::time::Instant::now();

    {
        let mut s = state.lock().unwrap();
        s.status = Some(DownloadStatus::Downloading(0, total_size));
    }
    ctx.request_repaint();

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                state.lock().unwrap().status = Some(DownloadStatus::Cancelled);
                ctx.request_repaint();
                return;
            }
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(data)) => {
                        downloaded += data.len() as u64;
                        bytes_vec.extend_from_slice(&data);
                        state.lock().unwrap().status =
                            Some(DownloadStatus::Downloading(downloaded, total_size));
                        if last_repaint.elapsed() >= std::time::Duration::from_millis(100) {
                            ctx.request_repaint();
                            last_repaint = std::time::Instant::now();
                        }
                    }
                    Some(Err(e)) => {
                        state.lock().unwrap().status = Some(DownloadStatus::Failed(e.to_string()));
                        ctx.request_repaint();
                        return;
                    }
                    None => break,
                }
            }
        }
    }

    let mut s = state.lock().unwrap();
    if std::fs::write(&dest, &bytes_vec).is_ok() {
        info!(path = %dest.display(), bytes = downloaded, "Download complete");
        s.dest = Some(dest);
        s.status = Some(DownloadStatus::Complete);
    } else {
        s.status = Some(DownloadStatus::Failed("Could not write file".into()));
    }
    drop(s);
    ctx.request_repaint();
}

fn spawn_zip_download(
    api: Arc<ApiClient>,
    keys: Vec<String>,
    dest: PathBuf,
    state: Arc<Mutex<DownloadState>>,
    cancel_token: CancellationToken,
    ctx: egui::Context,
    runtime: &tokio::runtime::Runtime,
) {
    runtime.spawn(async move {
        let response = tokio::select! {
            _ = cancel_token.cancelled() => {
                state.lock().unwrap().status = Some(DownloadStatus::Cancelled);
                ctx.request_repaint();
                return;
            }
            r = api.fetch_zip(&keys) => r,
        };
        match response {
            Ok(response) => {
                stream_to_file(response, dest, state, &ctx, &cancel_token).await;
            }
            Err(e) => {
                warn!(error = %e, "ZIP download failed");
                state.lock().unwrap().status = Some(DownloadStatus::Failed(e.to_string()));
                ctx.request_repaint();
            }
        }
    });
}

impl App {
    pub fn download_all(&mut self, ctx: &egui::Context) {
        let keys: Vec<String> = match &self.session {
            Some(session) => session.results.iter().map(|p| p.key.clone()).collect(),
            None => return,
        };
        self.start_zip_download(ctx, keys);
    }

    pub fn download_selected(&mut self, ctx: &egui::Context) {
        let keys: Vec<String> = match &self.session {
            Some(session) => session.selected.iter().cloned().collect(),
            None => return,
        };
        if keys.is_empty() {
            return;
        }
        self.start_zip_download(ctx, keys);
    }

    fn start_zip_download(&mut self, ctx: &egui::Context, keys: Vec<String>) {
        std::fs::create_dir_all(&self.download_path).ok();
        let dest = self
            .download_path
            .join(format!("photos-{}.zip", archive_timestamp()));

        info!(count = keys.len(), path = %dest.display(), "Starting ZIP download");

        let cancel_token = CancellationToken::new();
        self.cancel_token = Some(cancel_token.clone());
        {
            let mut s = self.download_state.lock().unwrap();
            s.status = None;
            s.photo_count = keys.len();
            s.dest = None;
        }
        self.show_download_modal = true;

        spawn_zip_download(
            self.api.clone(),
            keys,
            dest,
            self.download_state.clone(),
            cancel_token,
            ctx.clone(),
            &self.runtime,
        );
    }

    /// Save one photo to the download folder, bypassing the progress modal.
    pub fn download_single(&mut self, ctx: &egui::Context, key: &str) {
        std::fs::create_dir_all(&self.download_path).ok();
        let file_name = key.rsplit(['/', '\\']).next().unwrap_or(key).to_string();
        let dest = self.download_path.join(&file_name);
        let api = self.api.clone();
        let key = key.to_string();
        let ctx = ctx.clone();
        let toast_slot = self.pending_toast.clone();

        self.runtime.spawn(async move {
            let message = match api.download(&key).await {
                Ok(bytes) => match std::fs::write(&dest, &bytes) {
                    Ok(()) => format!("Saved {}", file_name),
                    Err(_) => "Could not write file".to_string(),
                },
                Err(e) => {
                    warn!(error = %e, "Single photo download failed");
                    "Download failed".to_string()
                }
            };
            *toast_slot.lock().unwrap() = Some(message);
            ctx.request_repaint();
        });
    }
}

/// Filesystem-safe timestamp for archive names, from the system clock.
fn archive_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}", secs)
}
