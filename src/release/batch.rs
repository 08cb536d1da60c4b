//! The create and release passes over every located repository.

use tracing::{debug, warn};

use super::merge::{ReleaseCandidate, release_prs};
use super::reconcile::reconcile_repository;
use crate::context::{ReleaseSession, TrainContext};
use crate::error::TrainError;
use crate::github::Repository;
use crate::locator::locate_repositories;

/// A repository the create pass left alone, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub repository: String,
    pub reason: String,
}

/// Outcome of a create pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateReport {
    /// Release pull request (or comparison) URLs, sorted.
    pub urls: Vec<String>,
    pub skipped: Vec<Skipped>,
}

/// Reconcile every repository in order.
///
/// Repositories without a release branch or without new commits are recorded
/// as skipped. Any other failure stops the pass.
pub async fn process_repos(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    repos: &[Repository],
) -> Result<CreateReport, TrainError> {
    let total = repos.len() as u64;
    let mut report = CreateReport::default();

    for (index, repo) in repos.iter().enumerate() {
        ctx.cancel.check()?;

        match reconcile_repository(ctx, session, repo).await {
            Ok(url) => report.urls.push(url),
            Err(e) if e.is_skippable() => {
                warn!(repository = %repo.full_name(), "skipping: {e}");
                report.skipped.push(Skipped {
                    repository: repo.full_name(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        ctx.progress
            .on_progress(index as u64 + 1, total, &repo.full_name());
    }

    report.urls.sort();
    Ok(report)
}

/// Open release pull requests of every repository, in repository order.
pub async fn collect_release_prs(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    repos: &[Repository],
) -> Result<Vec<ReleaseCandidate>, TrainError> {
    let total = repos.len() as u64;
    let mut candidates = Vec::new();

    for (index, repo) in repos.iter().enumerate() {
        ctx.cancel.check()?;

        let head = format!("{}:{}", repo.owner, repo.default_branch);
        ctx.throttle().await?;
        let prs = ctx
            .api
            .list_pull_requests(&repo.owner, &repo.name, &head, &session.release_branch)
            .await
            .map_err(|e| TrainError::github("pull requests", e))?;

        debug!(repository = %repo.full_name(), count = prs.len(), "collected release pull requests");
        candidates.extend(prs.into_iter().map(|pull_request| ReleaseCandidate {
            owner: repo.owner.clone(),
            repository: repo.name.clone(),
            pull_request,
        }));

        ctx.progress
            .on_progress(index as u64 + 1, total, &repo.full_name());
    }

    Ok(candidates)
}

/// Locate the repositories of `entity` and reconcile each one.
pub async fn create_releases(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    entity: &str,
) -> Result<CreateReport, TrainError> {
    let repos = locate_repositories(ctx, session, entity).await?;
    process_repos(ctx, session, &repos).await
}

/// Locate the repositories of `entity`, collect their release pull requests
/// and merge the clean ones.
pub async fn release_repos(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    entity: &str,
) -> Result<Vec<String>, TrainError> {
    let repos = locate_repositories(ctx, session, entity).await?;
    let candidates = collect_release_prs(ctx, session, &repos).await?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    release_prs(ctx, session, &candidates).await
}
