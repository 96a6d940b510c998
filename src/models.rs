//! Data models for the blog feed.
//!
//! - [`ListingResponse`]: envelope of the HubSpot blog-posts listing call
//! - [`NormalizedPost`]: fixed-shape post written for the static site
//! - [`ResultSet`]: the `{count, posts}` document persisted to disk
//!
//! Raw posts stay as [`serde_json::Value`]; the API's field names drift
//! between blogs and the normalizer looks them up by fallback chain.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An unvalidated post record exactly as the API returned it.
pub type RawPost = Value;

/// Body of `GET /cms/v3/blogs/posts`. Only `results` is read.
#[derive(Debug, Default, Deserialize)]
pub struct ListingResponse {
    /// `None` when the key is missing or `null`.
    #[serde(default)]
    pub results: Option<Vec<RawPost>>,
    /// Total matching posts server-side, logged for visibility.
    #[serde(default)]
    pub total: Option<u64>,
}

impl ListingResponse {
    pub fn into_posts(self) -> Vec<RawPost> {
        self.results.unwrap_or_default()
    }
}

/// A post with every field present and of a known shape.
///
/// Serialized with camelCase keys, which is what the site's templates read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPost {
    /// Passed through untouched; omitted when the source had no `id` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub title: String,
    pub slug: String,
    pub url: Option<String>,
    pub featured_image: Option<String>,
    pub tag_ids: Vec<Value>,
    /// UTC, millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
    pub published_at: Option<String>,
    pub author_names: Vec<String>,
}

/// The document written to `posts.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub count: usize,
    pub posts: Vec<NormalizedPost>,
}

impl ResultSet {
    /// The only way to build a `ResultSet`, so `count` always matches.
    pub fn new(posts: Vec<NormalizedPost>) -> Self {
        Self {
            count: posts.len(),
            posts,
        }
    }
}
