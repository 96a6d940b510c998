//! # HubSpot Blog Feed
//!
//! Fetches the latest published posts from the HubSpot CMS blog API and
//! writes a trimmed, normalized `posts.json` for a static site to render.
//!
//! ## Usage
//!
//! ```sh
//! HUBSPOT_PRIVATE_APP_TOKEN=pat-xxx hubspot_blog_feed
//! hubspot_blog_feed --limit 12 --sort-by-date -o public/posts.json -o site/data/posts.json
//! ```
//!
//! ## Pipeline
//!
//! 1. **Configure**: flags and environment become a validated [`config::Config`]
//! 2. **Fetch**: one listing request to the blog-posts endpoint
//! 3. **Normalize**: each raw record is mapped to a fixed-shape post
//! 4. **Output**: the `{count, posts}` document is written to every destination
//!
//! Any failure aborts the run before the output is written and exits non-zero.

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod normalize;
mod outputs;
mod utils;

use cli::Cli;
use config::Config;
use error::FeedError;
use models::ResultSet;
use normalize::{normalize_all, sort_by_published_desc};
use outputs::json;

/// What a successful run produced.
#[derive(Debug)]
struct RunSummary {
    count: usize,
    written: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hubspot_blog_feed starting up");

    let args = Cli::parse();
    let config = match Config::from_cli(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(?config, "Resolved configuration");

    let summary = match run(&config).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Run failed; nothing written");
            return Err(e.into());
        }
    };

    let paths = summary
        .written
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" and ");
    info!("Wrote {} with {} posts", paths, summary.count);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Fetch, normalize, optionally sort, and write.
#[instrument(level = "info", skip_all)]
async fn run(config: &Config) -> Result<RunSummary, FeedError> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let raws = api::fetch_posts(&client, config).await?;

    let mut posts = normalize_all(&raws, &config.links);
    if config.sort_by_date {
        sort_by_published_desc(&mut posts);
        debug!("Sorted posts by publish date, newest first");
    }

    let result = ResultSet::new(posts);
    let written = json::write_result_set(&result, &config.outputs).await?;

    Ok(RunSummary {
        count: result.count,
        written,
    })
}
