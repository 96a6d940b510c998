//! HubSpot CMS blog-posts API client.
//!
//! One listing request per run:
//!
//! ```text
//! GET {api_base}/cms/v3/blogs/posts?limit=N&state=PUBLISHED&archived=false
//! Authorization: Bearer <token>
//! ```
//!
//! There is no retry or pagination. A non-2xx answer is fatal and surfaces
//! as [`FeedError::Upstream`] with the response body attached.

use crate::config::Config;
use crate::error::FeedError;
use crate::models::{ListingResponse, RawPost};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const BLOG_POSTS_PATH: &str = "/cms/v3/blogs/posts";

/// Build the listing URL with its query parameters.
pub fn listing_url(api_base: &str, limit: u32) -> Result<Url, FeedError> {
    let raw = format!("{}{}", api_base.trim_end_matches('/'), BLOG_POSTS_PATH);
    let mut url = Url::parse(&raw)
        .map_err(|e| FeedError::InvalidConfig(format!("API URL {raw:?}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string())
        .append_pair("state", "PUBLISHED")
        .append_pair("archived", "false");
    Ok(url)
}

/// Fetch the latest published posts as raw JSON records.
///
/// # Errors
///
/// - [`FeedError::Upstream`] for any non-2xx status, carrying the body text
/// - [`FeedError::Http`] for transport failures or a body that is not JSON
#[instrument(level = "info", skip_all, fields(limit = config.limit))]
pub async fn fetch_posts(client: &Client, config: &Config) -> Result<Vec<RawPost>, FeedError> {
    let url = listing_url(&config.api_base, config.limit)?;
    debug!(%url, "Requesting blog posts");

    let t0 = Instant::now();
    let resp = client.get(url).bearer_auth(&config.token).send().await?;
    let status = resp.status();
    let elapsed_ms = t0.elapsed().as_millis();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_else(|e| {
            warn!(status = status.as_u16(), error = %e, "Failed to read error body");
            format!("<failed to read body: {e}>")
        });
        error!(
            status = status.as_u16(),
            elapsed_ms,
            body = %truncate_for_log(&body, 300),
            "HubSpot returned an error"
        );
        return Err(FeedError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    let listing: ListingResponse = resp.json().await?;
    let total = listing.total;
    let posts = listing.into_posts();
    info!(
        status = status.as_u16(),
        elapsed_ms,
        count = posts.len(),
        ?total,
        "Fetched blog posts"
    );
    Ok(posts)
}
