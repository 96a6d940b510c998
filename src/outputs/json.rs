//! JSON output for the static site.
//!
//! The [`ResultSet`] is pretty-printed with two-space indentation and written
//! to every configured destination, creating parent directories as needed:
//!
//! ```text
//! public/
//! └── posts.json   {"count": 6, "posts": [...]}
//! ```
//!
//! All destinations receive byte-identical content. Copies are staged in
//! temp files and only renamed into place once every one has been written,
//! so a failed run does not leave some destinations updated and others not.

use crate::error::FeedError;
use crate::models::ResultSet;
use crate::utils::ensure_parent_dir;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Serialize a [`ResultSet`] the way the site expects it.
pub fn render(result: &ResultSet) -> Result<String, FeedError> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    Ok(json)
}

/// Write the result set to each path in `outputs`.
///
/// Every parent directory is created and every copy is written to a hidden
/// sibling temp file before any destination is replaced, so a failure
/// leaves the existing outputs untouched.
///
/// # Returns
///
/// The paths written, in the order given, duplicates removed.
///
/// # Errors
///
/// [`FeedError::Io`] on the first directory or file that cannot be written.
#[instrument(level = "info", skip_all, fields(count = result.count, outputs = outputs.len()))]
pub async fn write_result_set(
    result: &ResultSet,
    outputs: &[PathBuf],
) -> Result<Vec<PathBuf>, FeedError> {
    let json = render(result)?;

    let mut targets: Vec<PathBuf> = Vec::with_capacity(outputs.len());
    for path in outputs {
        if !targets.contains(path) {
            targets.push(path.clone());
        }
    }

    for path in &targets {
        ensure_parent_dir(path).await?;
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(targets.len());
    for path in &targets {
        let tmp = temp_sibling(path);
        info!(path = %path.display(), tmp = %tmp.display(), "Writing JSON");
        if let Err(source) = fs::write(&tmp, &json).await {
            error!(path = %tmp.display(), error = %source, "Failed writing JSON");
            discard(&staged).await;
            let _ = fs::remove_file(&tmp).await;
            return Err(FeedError::Io { path: tmp, source });
        }
        staged.push((tmp, path.clone()));
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(tmp, path).await {
            error!(path = %path.display(), error = %source, "Failed moving JSON into place");
            discard(&staged[i..]).await;
            return Err(FeedError::Io {
                path: path.clone(),
                source,
            });
        }
        info!(path = %path.display(), bytes = json.len(), "Wrote posts JSON");
    }

    Ok(targets)
}

/// `dir/.posts.json.tmp` next to `dir/posts.json`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "posts.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

async fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = fs::remove_file(tmp).await {
            warn!(path = %tmp.display(), error = %e, "Could not remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedPost;
    use serde_json::{Value, json};

    fn post(slug: &str) -> NormalizedPost {
        NormalizedPost {
            id: Some(json!(slug)),
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            url: Some(format!("https://example.com/{slug}")),
            featured_image: None,
            tag_ids: vec![],
            published_at: None,
            author_names: vec![],
        }
    }

    #[test]
    fn test_render_is_pretty_with_two_space_indent() {
        let json = render(&ResultSet::new(vec![post("a")])).unwrap();
        assert!(json.starts_with("{\n  \"count\": 1,\n  \"posts\": ["));
        assert!(json.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_write_creates_dirs_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("public/posts.json");
        let set = ResultSet::new(vec![post("a"), post("b")]);

        let written = write_result_set(&set, &[target.clone()]).await.unwrap();
        assert_eq!(written, vec![target.clone()]);

        let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(on_disk["count"], 2);
        assert_eq!(on_disk["posts"].as_array().unwrap().len(), 2);
        assert_eq!(on_disk["posts"][1]["url"], "https://example.com/b");
        assert_eq!(on_disk["posts"][0]["featuredImage"], Value::Null);
    }

    #[tokio::test]
    async fn test_write_identical_copies() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("public/posts.json");
        let second = tmp.path().join("site/data/posts.json");
        let set = ResultSet::new(vec![post("a")]);

        write_result_set(&set, &[first.clone(), second.clone()])
            .await
            .unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_failing_second_destination_leaves_first_unwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("a/posts.json");
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = write_result_set(
            &ResultSet::new(vec![post("a")]),
            &[first.clone(), blocker.join("posts.json")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FeedError::Io { .. }));
        assert!(!first.exists());
        assert!(!temp_sibling(&first).exists());
    }

    #[tokio::test]
    async fn test_write_replaces_existing_and_leaves_no_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("posts.json");
        std::fs::write(&target, "stale").unwrap();

        let written = write_result_set(&ResultSet::new(vec![post("a")]), &[target.clone(), target.clone()])
            .await
            .unwrap();

        assert_eq!(written, vec![target.clone()]);
        assert_eq!(read_json(&target)["count"], 1);
        assert!(!temp_sibling(&target).exists());
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_write_into_file_parent_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("public");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = write_result_set(&ResultSet::new(vec![]), &[blocker.join("posts.json")])
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
    }
}
