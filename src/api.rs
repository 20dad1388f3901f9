//! HTTP client for the search and asset delivery services

use crate::error::{FetchError, SearchError};
use crate::types::{RawMatch, SearchResponse};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::Path;
use tracing::debug;

/// Capability the core consumes: fetch a resource's bytes by key, async,
/// may fail. Object-safe so tests can substitute a mock.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, key: &str) -> BoxFuture<'static, Result<Vec<u8>, FetchError>>;
}

/// Client for the face-match backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn image_url(&self, key: &str) -> String {
        format!("{}/images/{}", self.base_url, key)
    }

    pub fn download_url(&self, key: &str) -> String {
        format!("{}/download/{}", self.base_url, key)
    }

    /// Upload an image and run the face search. Returns the raw match list
    /// on success; server-side rejections come back as `SearchError::Rejected`.
    pub async fn search(
        &self,
        image_path: &Path,
        threshold: f32,
    ) -> Result<Vec<RawMatch>, SearchError> {
        let bytes = tokio::fs::read(image_path).await?;
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.jpg".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("threshold", threshold.to_string());

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(SearchError::Connection)?;

        let body: SearchResponse = response.json().await.map_err(SearchError::Connection)?;
        if body.success {
            debug!(count = body.matches.len(), "Search succeeded");
            Ok(body.matches)
        } else {
            Err(SearchError::Rejected(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    /// Download one photo's original bytes from `/download/{key}`.
    pub async fn download(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(self.download_url(key)).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch a ZIP of the given photo keys from `/download-all`.
    pub async fn fetch_zip(&self, keys: &[String]) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .post(format!("{}/download-all", self.base_url))
            .json(&serde_json::json!({ "image_paths": keys }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response)
    }
}

impl ResourceFetcher for ApiClient {
    fn fetch(&self, key: &str) -> BoxFuture<'static, Result<Vec<u8>, FetchError>> {
        let client = self.client.clone();
        let url = self.image_url(key);
        async move {
            let response = client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(FetchError::Status(response.status()));
            }
            Ok(response.bytes().await?.to_vec())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_builders_target_the_configured_base() {
        let api = ApiClient::new("http://localhost:5000");
        assert_eq!(api.image_url("event/p1.jpg"), "http://localhost:5000/images/event/p1.jpg");
        assert_eq!(
            api.download_url("event/p1.jpg"),
            "http://localhost:5000/download/event/p1.jpg"
        );
    }
}
