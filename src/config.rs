//! Validated runtime configuration.
//!
//! [`Config`] is built once from the parsed [`Cli`] at startup and passed by
//! reference to the fetch and normalize steps. Nothing downstream reads the
//! process environment.

use crate::cli::Cli;
use crate::error::FeedError;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Which source wins when choosing a post's public link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UrlMode {
    /// Use the absolute URL the API supplies, build one only when it is missing.
    #[default]
    PreferApi,
    /// Always build the link from the blog base and slug.
    AlwaysDerive,
}

/// Everything the normalizer needs to build post links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Site origin without a trailing `/`.
    pub base_url: String,
    /// Overrides each post's `blogSlug` when set.
    pub blog_prefix: Option<String>,
    pub mode: UrlMode,
}

impl LinkPolicy {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            blog_prefix: None,
            mode: UrlMode::PreferApi,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub api_base: String,
    pub limit: u32,
    pub sort_by_date: bool,
    pub outputs: Vec<PathBuf>,
    pub links: LinkPolicy,
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("limit", &self.limit)
            .field("sort_by_date", &self.sort_by_date)
            .field("outputs", &self.outputs)
            .field("links", &self.links)
            .finish()
    }
}

impl Config {
    /// Validate parsed arguments.
    ///
    /// # Errors
    ///
    /// - [`FeedError::MissingToken`] if no token (or a blank one) was given
    /// - [`FeedError::InvalidConfig`] if the blog base or API base is not an
    ///   absolute http(s) URL, or no output path is left
    pub fn from_cli(cli: Cli) -> Result<Self, FeedError> {
        let token = cli
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(FeedError::MissingToken)?;

        check_http_url("blog base", &cli.blog_base)?;
        check_http_url("API base", &cli.api_base)?;

        let outputs: Vec<PathBuf> = cli
            .outputs
            .into_iter()
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if outputs.is_empty() {
            return Err(FeedError::InvalidConfig(
                "at least one output path is required".to_string(),
            ));
        }

        let blog_prefix = cli
            .blog_prefix
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            token,
            api_base: cli.api_base.trim_end_matches('/').to_string(),
            limit: cli.limit,
            sort_by_date: cli.sort_by_date,
            outputs,
            links: LinkPolicy {
                blog_prefix,
                mode: cli.url_mode,
                ..LinkPolicy::new(&cli.blog_base)
            },
        })
    }
}

fn check_http_url(what: &str, raw: &str) -> Result<(), FeedError> {
    match Url::parse(raw) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
        Ok(u) => Err(FeedError::InvalidConfig(format!(
            "{what} must be http or https, got scheme {:?}",
            u.scheme()
        ))),
        Err(e) => Err(FeedError::InvalidConfig(format!(
            "{what} {raw:?} is not an absolute URL: {e}"
        ))),
    }
}
