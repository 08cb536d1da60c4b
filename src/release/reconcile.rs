//! Open or refresh the release pull request of one repository.

use tracing::{debug, info};

use crate::changelog::{Changelog, RELEASE_TITLE, classify_commits};
use crate::context::{ReleaseSession, TrainContext};
use crate::error::TrainError;
use crate::github::{NewPullRequest, PullRequestUpdate, Repository};

/// URL GitHub shows for a `base...head` comparison.
pub fn compare_url(owner: &str, repo: &str, base: &str, head: &str) -> String {
    format!("https://github.com/{owner}/{repo}/compare/{base}...{head}")
}

/// Bring the release pull request of `repo` up to date and return its URL.
///
/// The pull request merges the default branch into the release branch. An
/// existing one is retitled and gets a regenerated body; otherwise one is
/// opened. In dry-run nothing is written and a new pull request is reported as
/// its comparison URL.
///
/// `NoReleaseBranch` and `NoCommits` mean the repository should be skipped.
pub async fn reconcile_repository(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    repo: &Repository,
) -> Result<String, TrainError> {
    let owner = repo.owner.as_str();
    let name = repo.name.as_str();
    let base = session.release_branch.as_str();
    let head = repo.default_branch.as_str();

    ctx.throttle().await?;
    if let Err(e) = ctx.api.get_branch(owner, name, base).await {
        if e.is_not_found() {
            return Err(TrainError::NoReleaseBranch {
                repository: repo.full_name(),
                branch: base.to_string(),
            });
        }
        return Err(TrainError::github("get release branch", e));
    }

    ctx.throttle().await?;
    let existing = ctx
        .api
        .list_pull_requests(owner, name, &format!("{owner}:{head}"), base)
        .await
        .map_err(|e| TrainError::github("list pull requests", e))?;

    if let Some(pr) = existing.into_iter().next() {
        let changelog = match classify_commits(ctx, owner, name, base, head).await {
            Ok(changelog) => changelog,
            Err(TrainError::NoCommits { .. }) => Changelog::new(),
            Err(e) => return Err(e),
        };

        if session.dry_run {
            debug!(repository = %repo.full_name(), pr_number = pr.number, "dry run, not editing");
            return Ok(pr.html_url);
        }

        let update = PullRequestUpdate {
            title: RELEASE_TITLE.to_string(),
            body: changelog.render_body(),
        };
        ctx.throttle().await?;
        ctx.api
            .update_pull_request(owner, name, pr.number, &update)
            .await
            .map_err(|e| TrainError::github("edit pull request", e))?;

        info!(repository = %repo.full_name(), pr_number = pr.number, "updated release pull request");
        return Ok(pr.html_url);
    }

    let changelog = classify_commits(ctx, owner, name, base, head).await?;

    if session.dry_run {
        debug!(repository = %repo.full_name(), "dry run, not creating");
        return Ok(compare_url(owner, name, base, head));
    }

    let new_pr = NewPullRequest {
        title: RELEASE_TITLE.to_string(),
        head: head.to_string(),
        base: base.to_string(),
        body: changelog.render_body(),
        maintainer_can_modify: true,
    };
    ctx.throttle().await?;
    let created = ctx
        .api
        .create_pull_request(owner, name, &new_pr)
        .await
        .map_err(|e| TrainError::github("create pull request", e))?;

    info!(repository = %repo.full_name(), pr_number = created.number, "created release pull request");
    Ok(created.html_url)
}
