//! GitHub API operations using octocrab.

pub mod api;
pub mod auth;
pub mod client;

pub use api::{
    Account, AccountKind, Branch, CommitSummary, GitHubApi, MergeOutcome, NewPullRequest,
    PullRequestRef, PullRequestUpdate, Repository, RepositoryPage,
};
pub use auth::resolve_token;
pub use client::OctocrabApi;
