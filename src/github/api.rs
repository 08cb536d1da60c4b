//! The GitHub operations the release train needs, behind a mockable trait.

use async_trait::async_trait;

use crate::error::GitHubError;

/// Which kind of account an entity name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Organization,
    User,
}

/// An organization or user, with the repository counts used to size progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub login: String,
    pub kind: AccountKind,
    pub public_repos: u64,
    pub private_repos: u64,
}

impl Account {
    pub fn total_repos(&self) -> u64 {
        self.public_repos + self.private_repos
    }
}

/// Snapshot of a repository as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub owner: String,
    pub default_branch: String,
    pub archived: bool,
    pub topics: Vec<String>,
}

impl Repository {
    /// `owner/name`, as GitHub displays it.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// One page of a repository listing.
#[derive(Debug, Clone, Default)]
pub struct RepositoryPage {
    pub repositories: Vec<Repository>,
    /// Whether the API advertised a next page.
    pub has_next: bool,
}

/// A branch reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub sha: String,
}

/// A commit from a base...head comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub sha: String,
    pub message: String,
}

/// A pull request as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    pub head_ref: String,
    pub base_ref: String,
    /// Only populated when the pull request is fetched individually.
    pub mergeable_state: Option<String>,
    pub html_url: String,
    pub title: String,
    pub body: Option<String>,
}

/// Payload for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub maintainer_can_modify: bool,
}

/// Payload for editing a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestUpdate {
    pub title: String,
    pub body: String,
}

/// Result of a merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: bool,
    pub sha: Option<String>,
    pub message: Option<String>,
}

/// GitHub REST operations used by the release train.
///
/// Implemented by [`crate::github::OctocrabApi`] for real traffic and by
/// recording doubles in tests. Implementations do not throttle; callers acquire
/// a rate-limiter token before each call.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Look up an organization. Missing organizations yield `GitHubError::NotFound`.
    async fn get_org(&self, name: &str) -> Result<Account, GitHubError>;

    /// Look up a user. Missing users yield `GitHubError::NotFound`.
    async fn get_user(&self, name: &str) -> Result<Account, GitHubError>;

    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, GitHubError>;

    async fn list_user_repos(
        &self,
        user: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, GitHubError>;

    /// Fetch a branch. Missing branches yield `GitHubError::NotFound`.
    async fn get_branch(&self, owner: &str, repo: &str, branch: &str)
    -> Result<Branch, GitHubError>;

    /// List open pull requests filtered by head (`owner:branch`) and base.
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
    ) -> Result<Vec<PullRequestRef>, GitHubError>;

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequestRef, GitHubError>;

    async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequestRef, GitHubError>;

    /// Commits reachable from `head` but not from `base`, oldest first.
    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommitSummary>, GitHubError>;

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestRef, GitHubError>;

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        commit_message: &str,
    ) -> Result<MergeOutcome, GitHubError>;

    /// Login of the account the token belongs to.
    async fn authenticated_login(&self) -> Result<String, GitHubError>;

    /// Logins of the organizations the authenticated account belongs to.
    async fn list_own_orgs(&self) -> Result<Vec<String>, GitHubError>;
}
