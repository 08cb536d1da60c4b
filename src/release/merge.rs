//! Merge the release pull requests that are ready.

use tracing::{debug, info, warn};

use crate::context::{ReleaseSession, TrainContext};
use crate::error::TrainError;
use crate::github::PullRequestRef;

/// Commit message of every merge.
pub const MERGE_MESSAGE: &str = "release automerged by train";

/// An open release pull request and the repository it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCandidate {
    pub owner: String,
    pub repository: String,
    pub pull_request: PullRequestRef,
}

impl ReleaseCandidate {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}

/// Only a "clean" pull request may be merged.
pub fn is_clean(mergeable_state: Option<&str>) -> bool {
    mergeable_state.is_some_and(|state| state.eq_ignore_ascii_case("clean"))
}

/// Merge every clean candidate and return the sorted URLs of those merged.
///
/// Each pull request is fetched again for its live mergeable state, in dry-run
/// too. In dry-run clean pull requests are reported without being merged.
pub async fn release_prs(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    candidates: &[ReleaseCandidate],
) -> Result<Vec<String>, TrainError> {
    let total = candidates.len() as u64;
    let mut released = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        ctx.cancel.check()?;

        let owner = candidate.owner.as_str();
        let name = candidate.repository.as_str();
        let number = candidate.pull_request.number;

        ctx.throttle().await?;
        let live = ctx
            .api
            .get_pull_request(owner, name, number)
            .await
            .map_err(|e| TrainError::github("check mergeable", e))?;

        if !is_clean(live.mergeable_state.as_deref()) {
            debug!(
                repository = %candidate.full_name(),
                pr_number = number,
                state = ?live.mergeable_state,
                "not clean, leaving open"
            );
        } else if session.dry_run {
            released.push(live.html_url);
        } else {
            ctx.throttle().await?;
            let outcome = ctx
                .api
                .merge_pull_request(owner, name, number, MERGE_MESSAGE)
                .await
                .map_err(|e| TrainError::github("merge", e))?;

            if outcome.merged {
                info!(repository = %candidate.full_name(), pr_number = number, "merged release pull request");
                released.push(live.html_url);
            } else {
                warn!(
                    repository = %candidate.full_name(),
                    pr_number = number,
                    message = ?outcome.message,
                    "merge was not applied"
                );
            }
        }

        ctx.progress
            .on_progress(index as u64 + 1, total, &candidate.full_name());
    }

    released.sort();
    Ok(released)
}
