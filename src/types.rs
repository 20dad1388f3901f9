//! Common types and data structures

/// Raw match entry as returned by the search service.
#[derive(Clone, serde::Deserialize)]
pub struct RawMatch {
    pub image_path: String,
    pub similarity: f32,
}

/// Response envelope of the `/search` endpoint.
#[derive(serde::Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub matches: Vec<RawMatch>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Which screen the app is showing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Searching,
    Results,
}

/// Status of the ZIP (or single-file) download in progress.
#[derive(Clone, PartialEq)]
pub enum DownloadStatus {
    Downloading(u64, u64), // (downloaded_bytes, total_bytes)
    Complete,
    Cancelled,
    Failed(String),
}

/// State tracking for the download modal, shared with the download task.
#[derive(Default)]
pub struct DownloadState {
    pub status: Option<DownloadStatus>,
    pub photo_count: usize,
    pub dest: Option<std::path::PathBuf>,
}
