//! Error type for the feed pipeline.
//!
//! Every failure here is fatal: the run stops before anything is written.
//! Field-level problems in post records never surface as errors, the
//! normalizer degrades them to `null`/empty values instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// No API token was supplied via flag or environment.
    #[error("Missing HUBSPOT_PRIVATE_APP_TOKEN")]
    MissingToken,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blog API answered with a non-success status.
    #[error("HubSpot error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize posts: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_carries_status_and_body() {
        let err = FeedError::Upstream {
            status: 401,
            body: r#"{"message":"expired"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"HubSpot error 401: {"message":"expired"}"#);
    }

    #[test]
    fn test_io_display_names_path() {
        let err = FeedError::Io {
            path: PathBuf::from("public/posts.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("public/posts.json"));
        assert!(msg.contains("denied"));
    }
}
