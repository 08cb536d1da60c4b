//! Build a changelog from the commits between two refs.

use tracing::debug;

use super::format::Changelog;
use super::rules::classify_line;
use crate::context::TrainContext;
use crate::error::TrainError;

/// Classify every commit on `head` that is not on `base`.
///
/// Fails with `TrainError::NoCommits` when the comparison is empty.
pub async fn classify_commits(
    ctx: &TrainContext<'_>,
    owner: &str,
    repo: &str,
    base: &str,
    head: &str,
) -> Result<Changelog, TrainError> {
    ctx.throttle().await?;
    let commits = ctx
        .api
        .compare_commits(owner, repo, base, head)
        .await
        .map_err(|e| TrainError::github("compare commits", e))?;

    if commits.is_empty() {
        return Err(TrainError::NoCommits {
            repository: format!("{owner}/{repo}"),
            base: base.to_string(),
            head: head.to_string(),
        });
    }

    let mut changelog = Changelog::new();
    for commit in &commits {
        if let Some((category, entry)) = classify_line(&commit.message) {
            changelog.push(category, entry);
        }
    }

    debug!(
        owner,
        repo,
        commits = commits.len(),
        entries = changelog.len(),
        "classified commits"
    );
    Ok(changelog)
}
