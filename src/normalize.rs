//! Mapping raw HubSpot post records to [`NormalizedPost`].
//!
//! The API's records are loosely shaped: the same datum shows up under
//! different keys depending on the blog and API version, dates come as epoch
//! milliseconds or strings, authors as a list or a single value. Each output
//! field is resolved through a fixed fallback chain and the first *present*
//! candidate wins. A value is present when it is a non-empty string or a
//! non-zero number; `null`, `false`, `""` and `0` are treated as missing.
//!
//! Normalization is total: a malformed field degrades to `null`, `""` or an
//! empty list, it never aborts the run.
//!
//! | Field | Chain |
//! |-------|-------|
//! | `title` | `title`, `htmlTitle`, `pageTitle`, `name`, `slug`, `"Untitled"` |
//! | `slug` | `slug`, path of `url`, `""` |
//! | `url` | `url`, `absoluteUrl`, `postUrl`, derived from slug (see [`UrlMode`]) |
//! | `featuredImage` | string, or object `url` |
//! | `tagIds` | `tagIds`, `tagList`, `[]` |
//! | `publishedAt` | `publishedAt`, `publishDate`, `updatedAt`, `createdAt` |
//! | `authorNames` | `authors[]` or `author`, each `name`, `fullName`, `displayName` |

use crate::config::{LinkPolicy, UrlMode};
use crate::models::{NormalizedPost, RawPost};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::cmp::Reverse;
use tracing::{debug, instrument};
use url::Url;

const TITLE_KEYS: &[&str] = &["title", "htmlTitle", "pageTitle", "name", "slug"];
const URL_KEYS: &[&str] = &["url", "absoluteUrl", "postUrl"];
const TAG_KEYS: &[&str] = &["tagIds", "tagList"];
const DATE_KEYS: &[&str] = &["publishedAt", "publishDate", "updatedAt", "createdAt"];
const AUTHOR_NAME_KEYS: &[&str] = &["name", "fullName", "displayName"];

const UNTITLED: &str = "Untitled";

/// Date-time layouts carrying a numeric offset, including the colon-less
/// `+0000` form RFC 3339 rejects.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Date-time layouts tried after the offset forms. Offset-less values are
/// taken as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %H:%M:%S",
];

/// Date-only layouts, taken as UTC midnight. `%B` also accepts abbreviated
/// month names when parsing.
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%d %B %Y", "%m/%d/%Y"];

/// Normalize a single raw post.
///
/// `raw` is normally a JSON object; anything else normalizes like an empty
/// object (title `"Untitled"`, everything else empty or `null`).
pub fn normalize(raw: &RawPost, links: &LinkPolicy) -> NormalizedPost {
    let title = first_present(raw, TITLE_KEYS).unwrap_or_else(|| UNTITLED.to_string());
    let slug = resolve_slug(raw);

    let url = match links.mode {
        UrlMode::PreferApi => {
            first_present(raw, URL_KEYS).or_else(|| derive_url(raw, &slug, links))
        }
        UrlMode::AlwaysDerive => derive_url(raw, &slug, links),
    };

    NormalizedPost {
        id: raw.get("id").cloned(),
        title,
        slug,
        url,
        featured_image: featured_image(raw.get("featuredImage")),
        tag_ids: tag_ids(raw),
        published_at: DATE_KEYS.iter().find_map(|k| raw.get(*k).and_then(to_iso)),
        author_names: author_names(raw),
    }
}

/// Normalize every record, preserving fetch order.
#[instrument(level = "debug", skip_all, fields(count = raws.len()))]
pub fn normalize_all(raws: &[RawPost], links: &LinkPolicy) -> Vec<NormalizedPost> {
    raws.iter()
        .map(|raw| {
            let post = normalize(raw, links);
            if post.url.is_none() {
                debug!(id = ?post.id, title = %post.title, "Post has neither a URL nor a slug");
            }
            post
        })
        .collect()
}

/// Sort newest first by `publishedAt`.
///
/// Posts without a date sort as the earliest. The sort is stable, so posts
/// with equal (or missing) dates keep their fetch order.
pub fn sort_by_published_desc(posts: &mut [NormalizedPost]) {
    posts.sort_by_key(|p| {
        Reverse(
            p.published_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok()),
        )
    });
}

/// Convert a timestamp-ish JSON value to `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// Numbers and all-digit strings are epoch milliseconds. Other strings are
/// parsed as RFC 3339, RFC 2822, ISO date-time with a `+hhmm` offset or none,
/// or a bare date (`2024-03-05`, `March 5, 2024`, `03/05/2024`). Returns `None` for anything unparseable, for missing values,
/// and for dates outside years 0..=9999.
pub fn to_iso(value: &Value) -> Option<String> {
    let dt = match value {
        Value::Number(n) => {
            let ms = n.as_f64()?;
            if ms == 0.0 {
                return None;
            }
            from_epoch_millis(ms)?
        }
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) if s.bytes().all(|b| b.is_ascii_digit()) => {
            DateTime::from_timestamp_millis(s.parse::<i64>().ok()?)?
        }
        Value::String(s) => parse_date_str(s)?,
        _ => return None,
    };

    if !(0..=9999).contains(&dt.year()) {
        return None;
    }
    Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn from_epoch_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(ms.trunc() as i64)
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NAIVE_DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

/// The value as a string if it is present: a non-empty string, or a
/// non-zero number rendered as text.
fn present_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn first_present(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| present_str(raw.get(*k)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn resolve_slug(raw: &Value) -> String {
    if let Some(slug) = present_str(raw.get("slug")) {
        return slug;
    }
    raw.get("url")
        .and_then(Value::as_str)
        .and_then(|u| Url::parse(u).ok())
        .map(|u| u.path().trim_matches('/').to_string())
        .unwrap_or_default()
}

/// `base + [/prefix] + /slug`, or `None` when there is no slug.
fn derive_url(raw: &Value, slug: &str, links: &LinkPolicy) -> Option<String> {
    let slug = slug.trim_start_matches('/');
    if slug.is_empty() {
        return None;
    }

    let prefix = links
        .blog_prefix
        .clone()
        .or_else(|| present_str(raw.get("blogSlug")))
        .map(|p| p.trim_matches('/').to_string())
        .filter(|p| !p.is_empty());

    Some(match prefix {
        Some(prefix) => format!("{}/{}/{}", links.base_url, prefix, slug),
        None => format!("{}/{}", links.base_url, slug),
    })
}

fn featured_image(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        obj @ Value::Object(_) => obj
            .get("url")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// First of `tagIds`/`tagList` that is an array. An empty `tagIds` still
/// wins over a populated `tagList`.
fn tag_ids(raw: &Value) -> Vec<Value> {
    TAG_KEYS
        .iter()
        .find_map(|k| raw.get(*k).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

fn author_names(raw: &Value) -> Vec<String> {
    let entries: Vec<&Value> = match raw.get("authors") {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => raw.get("author").filter(|a| is_truthy(a)).into_iter().collect(),
    };

    entries.into_iter().filter_map(author_name).collect()
}

fn author_name(author: &Value) -> Option<String> {
    match author {
        Value::Object(_) => first_present(author, AUTHOR_NAME_KEYS),
        other => present_str(Some(other)),
    }
}
