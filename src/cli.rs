//! Command-line interface definitions for the HubSpot blog feed.
//!
//! Every option can also be supplied through an environment variable, which
//! is how the feed is normally configured in CI. The parsed [`Cli`] is turned
//! into a validated [`crate::config::Config`] before anything else runs.

use crate::config::UrlMode;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Command-line arguments for the HubSpot blog feed.
///
/// # Examples
///
/// ```sh
/// # Token from the environment, defaults for everything else
/// HUBSPOT_PRIVATE_APP_TOKEN=pat-xxx hubspot_blog_feed
///
/// # Two identical copies, newest posts first
/// hubspot_blog_feed -o public/posts.json -o site/data/posts.json --sort-by-date
///
/// # Ignore the API's own links and always build them from the blog base
/// hubspot_blog_feed --url-mode always-derive --blog-prefix green-basket-blog
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// HubSpot private app token used as the bearer credential
    #[arg(long, env = "HUBSPOT_PRIVATE_APP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL used to build links for posts the API gives no URL for
    #[arg(
        long,
        env = "BLOG_BASE",
        default_value = "https://hubspot.greenbasketlaundry.com"
    )]
    pub blog_base: String,

    /// Blog path prefix, overrides each post's `blogSlug`
    #[arg(long, env = "BLOG_PREFIX")]
    pub blog_prefix: Option<String>,

    /// Number of posts to request
    #[arg(
        long,
        env = "HS_LIMIT",
        default_value_t = 6,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub limit: u32,

    /// How post links are chosen
    #[arg(long, env = "URL_MODE", value_enum, default_value_t = UrlMode::PreferApi)]
    pub url_mode: UrlMode,

    /// Sort posts by publish date, newest first
    ///
    /// The environment value accepts `1/0`, `yes/no`, `on/off`, `true/false`.
    #[arg(
        long,
        env = "SORT_BY_DATE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub sort_by_date: bool,

    /// Output file; repeat the flag to write identical copies
    #[arg(
        short,
        long = "output",
        env = "POSTS_OUTPUT",
        value_delimiter = ',',
        default_value = "public/posts.json"
    )]
    pub outputs: Vec<PathBuf>,

    /// HubSpot API origin
    #[arg(long, env = "HUBSPOT_API_BASE", default_value = "https://api.hubapi.com")]
    pub api_base: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "hubspot_blog_feed",
            "--token",
            "pat-123",
            "--blog-base",
            "https://blog.example.com/",
            "--limit",
            "12",
        ]);

        assert_eq!(cli.token.as_deref(), Some("pat-123"));
        assert_eq!(cli.blog_base, "https://blog.example.com/");
        assert_eq!(cli.limit, 12);
    }

    #[test]
    fn test_cli_repeated_outputs() {
        let cli = Cli::parse_from([
            "hubspot_blog_feed",
            "-o",
            "public/posts.json",
            "-o",
            "site/data/posts.json",
        ]);

        assert_eq!(
            cli.outputs,
            vec![
                PathBuf::from("public/posts.json"),
                PathBuf::from("site/data/posts.json")
            ]
        );
    }

    #[test]
    fn test_cli_url_mode_and_sort() {
        let cli = Cli::parse_from([
            "hubspot_blog_feed",
            "--url-mode",
            "always-derive",
            "--sort-by-date",
        ]);

        assert_eq!(cli.url_mode, UrlMode::AlwaysDerive);
        assert!(cli.sort_by_date);
    }

    #[test]
    fn test_cli_sort_by_date_from_env_numeric() {
        // Only this test touches SORT_BY_DATE, and no other test asserts it is off.
        unsafe { std::env::set_var("SORT_BY_DATE", "1") };
        let on = Cli::try_parse_from(["hubspot_blog_feed", "--token", "t"]);
        unsafe { std::env::set_var("SORT_BY_DATE", "no") };
        let off = Cli::try_parse_from(["hubspot_blog_feed", "--token", "t"]);
        unsafe { std::env::remove_var("SORT_BY_DATE") };

        assert!(on.unwrap().sort_by_date);
        assert!(!off.unwrap().sort_by_date);
    }

    #[test]
    fn test_cli_rejects_zero_limit() {
        let res = Cli::try_parse_from(["hubspot_blog_feed", "--limit", "0"]);
        assert!(res.is_err());
    }
}
