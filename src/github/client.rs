//! `GitHubApi` implementation over octocrab.
//!
//! Pull request and comparison calls use octocrab's typed handlers. Account,
//! repository listing and branch lookups go through generic routes with local
//! response types.

use async_trait::async_trait;
use octocrab::models::pulls::{MergeableState, PullRequest};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::api::{
    Account, AccountKind, Branch, CommitSummary, GitHubApi, MergeOutcome, NewPullRequest,
    PullRequestRef, PullRequestUpdate, Repository, RepositoryPage,
};
use crate::error::GitHubError;

#[derive(Deserialize)]
struct RawAccount {
    login: String,
    #[serde(default)]
    public_repos: Option<u64>,
    #[serde(default)]
    total_private_repos: Option<u64>,
}

impl RawAccount {
    fn into_account(self, kind: AccountKind) -> Account {
        Account {
            login: self.login,
            kind,
            public_repos: self.public_repos.unwrap_or(0),
            private_repos: self.total_private_repos.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Deserialize)]
struct RawRepository {
    name: String,
    owner: RawOwner,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    topics: Vec<String>,
}

impl From<RawRepository> for Repository {
    fn from(raw: RawRepository) -> Self {
        Self {
            name: raw.name,
            owner: raw.owner.login,
            default_branch: raw.default_branch.unwrap_or_default(),
            archived: raw.archived,
            topics: raw.topics,
        }
    }
}

#[derive(Deserialize)]
struct RawBranchCommit {
    sha: String,
}

#[derive(Deserialize)]
struct RawBranch {
    name: String,
    commit: RawBranchCommit,
}

fn pull_request_from_octocrab(pr: &PullRequest) -> PullRequestRef {
    PullRequestRef {
        number: pr.number,
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
        mergeable_state: pr.mergeable_state.as_ref().map(|s| mergeable_state_name(s).to_string()),
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        title: pr.title.clone().unwrap_or_default(),
        body: pr.body.clone(),
    }
}

/// GitHub's wire name for a mergeable state.
fn mergeable_state_name(state: &MergeableState) -> &'static str {
    match state {
        MergeableState::Behind => "behind",
        MergeableState::Blocked => "blocked",
        MergeableState::Clean => "clean",
        MergeableState::Dirty => "dirty",
        MergeableState::Draft => "draft",
        MergeableState::HasHooks => "has_hooks",
        MergeableState::Unstable => "unstable",
        // MergeableState is non-exhaustive
        _ => "unknown",
    }
}

/// Percent-encode a branch name for use as a single path segment.
fn path_segment(branch: &str) -> String {
    urlencoding::encode(branch).into_owned()
}

#[derive(Serialize)]
struct RepoListParams {
    #[serde(rename = "type")]
    repo_type: &'static str,
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct PerPageParams {
    per_page: u8,
}

/// GitHub service using octocrab.
pub struct OctocrabApi {
    client: Octocrab,
}

impl OctocrabApi {
    /// Build a client for api.github.com authenticated with a personal token.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::Client(Box::new(e)))?;

        Ok(Self { client })
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(client: Octocrab) -> Self {
        Self { client }
    }

    async fn list_repos(
        &self,
        route: String,
        operation: &'static str,
        owner: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, GitHubError> {
        let params = RepoListParams {
            repo_type: "all",
            per_page,
            page,
        };

        let result: Page<RawRepository> = self
            .client
            .get(route, Some(&params))
            .await
            .map_err(|e| GitHubError::from_octocrab(operation, &format!("repositories of {owner}"), e))?;

        debug!(owner, page, count = result.items.len(), has_next = result.next.is_some(), "listed repositories");

        Ok(RepositoryPage {
            has_next: result.next.is_some(),
            repositories: result.items.into_iter().map(Repository::from).collect(),
        })
    }
}

#[async_trait]
impl GitHubApi for OctocrabApi {
    async fn get_org(&self, name: &str) -> Result<Account, GitHubError> {
        debug!(name, "getting organization");
        let raw: RawAccount = self
            .client
            .get(format!("/orgs/{name}"), None::<&()>)
            .await
            .map_err(|e| GitHubError::from_octocrab("get_org", &format!("organization {name}"), e))?;

        Ok(raw.into_account(AccountKind::Organization))
    }

    async fn get_user(&self, name: &str) -> Result<Account, GitHubError> {
        debug!(name, "getting user");
        let raw: RawAccount = self
            .client
            .get(format!("/users/{name}"), None::<&()>)
            .await
            .map_err(|e| GitHubError::from_octocrab("get_user", &format!("user {name}"), e))?;

        Ok(raw.into_account(AccountKind::User))
    }

    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, GitHubError> {
        self.list_repos(format!("/orgs/{org}/repos"), "list_org_repos", org, page, per_page)
            .await
    }

    async fn list_user_repos(
        &self,
        user: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, GitHubError> {
        self.list_repos(format!("/users/{user}/repos"), "list_user_repos", user, page, per_page)
            .await
    }

    async fn get_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Branch, GitHubError> {
        debug!(owner, repo, branch, "getting branch");
        let raw: RawBranch = self
            .client
            .get(
                format!("/repos/{owner}/{repo}/branches/{}", path_segment(branch)),
                None::<&()>,
            )
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("get_branch", &format!("branch {branch} of {owner}/{repo}"), e)
            })?;

        Ok(Branch {
            name: raw.name,
            sha: raw.commit.sha,
        })
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
    ) -> Result<Vec<PullRequestRef>, GitHubError> {
        debug!(owner, repo, head, base, "listing pull requests");
        let prs = self
            .client
            .pulls(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .head(head)
            .base(base)
            .send()
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("list_pull_requests", &format!("pull requests of {owner}/{repo}"), e)
            })?;

        debug!(count = prs.items.len(), "listed pull requests");
        Ok(prs.items.iter().map(pull_request_from_octocrab).collect())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequestRef, GitHubError> {
        debug!(owner, repo, head = %pr.head, base = %pr.base, "creating pull request");
        let created = self
            .client
            .pulls(owner, repo)
            .create(&pr.title, &pr.head, &pr.base)
            .body(&pr.body)
            .maintainer_can_modify(pr.maintainer_can_modify)
            .send()
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("create_pull_request", &format!("pull requests of {owner}/{repo}"), e)
            })?;

        let created = pull_request_from_octocrab(&created);
        debug!(pr_number = created.number, "created pull request");
        Ok(created)
    }

    async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequestRef, GitHubError> {
        debug!(owner, repo, pr_number = number, "updating pull request");
        let updated = self
            .client
            .pulls(owner, repo)
            .update(number)
            .title(&update.title)
            .body(&update.body)
            .send()
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("update_pull_request", &format!("pull request {owner}/{repo}#{number}"), e)
            })?;

        Ok(pull_request_from_octocrab(&updated))
    }

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommitSummary>, GitHubError> {
        debug!(owner, repo, base, head, "comparing commits");
        let comparison = self
            .client
            .commits(owner, repo)
            .compare(path_segment(base), path_segment(head))
            .send()
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("compare_commits", &format!("comparison {base}...{head} of {owner}/{repo}"), e)
            })?;

        debug!(count = comparison.commits.len(), "compared commits");
        Ok(comparison
            .commits
            .into_iter()
            .map(|c| CommitSummary {
                sha: c.sha,
                message: c.commit.message,
            })
            .collect())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestRef, GitHubError> {
        debug!(owner, repo, pr_number = number, "getting pull request");
        let pr = self
            .client
            .pulls(owner, repo)
            .get(number)
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("get_pull_request", &format!("pull request {owner}/{repo}#{number}"), e)
            })?;

        Ok(pull_request_from_octocrab(&pr))
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        commit_message: &str,
    ) -> Result<MergeOutcome, GitHubError> {
        debug!(owner, repo, pr_number = number, "merging pull request");
        let result = self
            .client
            .pulls(owner, repo)
            .merge(number)
            .message(commit_message)
            .send()
            .await
            .map_err(|e| {
                GitHubError::from_octocrab("merge_pull_request", &format!("pull request {owner}/{repo}#{number}"), e)
            })?;

        debug!(pr_number = number, merged = result.merged, sha = ?result.sha, "merge complete");
        Ok(MergeOutcome {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        })
    }

    async fn authenticated_login(&self) -> Result<String, GitHubError> {
        let raw: RawOwner = self
            .client
            .get("/user", None::<&()>)
            .await
            .map_err(|e| GitHubError::from_octocrab("authenticated_login", "authenticated user", e))?;

        Ok(raw.login)
    }

    async fn list_own_orgs(&self) -> Result<Vec<String>, GitHubError> {
        let result: Page<RawOwner> = self
            .client
            .get("/user/orgs", Some(&PerPageParams { per_page: 100 }))
            .await
            .map_err(|e| GitHubError::from_octocrab("list_own_orgs", "organizations of authenticated user", e))?;

        Ok(result.items.into_iter().map(|o| o.login).collect())
    }
}
