//! Error types for the API boundary

use thiserror::Error;

/// Failure fetching a single resource. Never surfaced to the user directly;
/// the cache records it and the grid/modal fall back to a placeholder.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Failure of the search request itself. Surfaced as a friendly message;
/// no session state is created.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("could not read the uploaded image: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not reach the server: {0}")]
    Connection(reqwest::Error),
    #[error("search rejected: {0}")]
    Rejected(String),
}

impl SearchError {
    /// Map raw server error strings to something a guest can act on.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Connection(e) => format!("Could not connect to the server: {}", e),
            SearchError::Io(_) => "Could not read the uploaded image".to_string(),
            SearchError::Rejected(raw) => {
                if raw.contains("Face could not be detected") {
                    "We could not detect a face in the photo".to_string()
                } else if raw.contains("No face detected") {
                    "No face was found in the photo".to_string()
                } else if raw.contains("Too many matches") {
                    "Too many matches found - try a clearer photo or a different angle".to_string()
                } else if raw.contains("Very few matches") {
                    "Very few matches found - try a clearer photo or a different angle".to_string()
                } else {
                    "Something went wrong processing the photo".to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_server_errors_map_to_friendly_messages() {
        let e = SearchError::Rejected("Face could not be detected in the input".into());
        assert_eq!(e.user_message(), "We could not detect a face in the photo");

        let e = SearchError::Rejected("Too many matches (4012)".into());
        assert!(e.user_message().starts_with("Too many matches"));

        let e = SearchError::Rejected("internal assertion xyz".into());
        assert_eq!(
            e.user_message(),
            "Something went wrong processing the photo"
        );
    }
}
