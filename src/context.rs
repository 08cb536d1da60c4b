//! Per-invocation state handed to every engine operation.

use std::collections::HashSet;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::TrainError;
use crate::github::GitHubApi;
use crate::progress::ProgressSink;
use crate::throttle::RateLimiter;

/// What a single create or release invocation operates with. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSession {
    /// Base branch of every release pull request.
    pub release_branch: String,
    pub dry_run: bool,
    /// Lowercased repository names and `owner/name` pairs.
    pub ignore_repos: HashSet<String>,
    /// Lowercased topics.
    pub ignore_topics: HashSet<String>,
}

impl ReleaseSession {
    pub fn new(release_branch: impl Into<String>, dry_run: bool) -> Self {
        Self {
            release_branch: release_branch.into(),
            dry_run,
            ignore_repos: HashSet::new(),
            ignore_topics: HashSet::new(),
        }
    }

    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self::new(config.release_branch.clone(), dry_run)
            .with_ignored_repos(&config.github.ignores.repos)
            .with_ignored_topics(&config.github.ignores.topics)
    }

    pub fn with_ignored_repos<S: AsRef<str>>(mut self, repos: &[S]) -> Self {
        self.ignore_repos
            .extend(repos.iter().map(|r| r.as_ref().trim().to_lowercase()));
        self
    }

    pub fn with_ignored_topics<S: AsRef<str>>(mut self, topics: &[S]) -> Self {
        self.ignore_topics
            .extend(topics.iter().map(|t| t.as_ref().trim().to_lowercase()));
        self
    }
}

/// Collaborators shared by the locator, classifier, reconciler and merge evaluator.
#[derive(Clone, Copy)]
pub struct TrainContext<'a> {
    pub api: &'a dyn GitHubApi,
    pub limiter: &'a RateLimiter,
    pub cancel: &'a CancelToken,
    pub progress: &'a dyn ProgressSink,
}

impl<'a> TrainContext<'a> {
    pub fn new(
        api: &'a dyn GitHubApi,
        limiter: &'a RateLimiter,
        cancel: &'a CancelToken,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            api,
            limiter,
            cancel,
            progress,
        }
    }

    /// Take a rate-limiter token. Call immediately before each API request.
    pub async fn throttle(&self) -> Result<(), TrainError> {
        self.limiter.wait(self.cancel).await
    }
}
