//! Shared test utilities for integration tests.
//!
//! Not all helpers are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use octocrab::Octocrab;
use wiremock::MockServer;

use train::error::GitHubError;
use train::github::{
    Account, AccountKind, Branch, CommitSummary, GitHubApi, MergeOutcome, NewPullRequest,
    PullRequestRef, PullRequestUpdate, Repository, RepositoryPage,
};

/// Build an octocrab client pointing at a mock server.
pub async fn mock_client(server: &MockServer) -> Octocrab {
    Octocrab::builder()
        .base_uri(server.uri())
        .expect("Failed to set base URI")
        .build()
        .expect("Failed to build octocrab")
}

pub fn repo(owner: &str, name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        owner: owner.to_string(),
        default_branch: "main".to_string(),
        archived: false,
        topics: Vec::new(),
    }
}

pub fn pull_request(owner: &str, name: &str, number: u64) -> PullRequestRef {
    PullRequestRef {
        number,
        head_ref: "main".to_string(),
        base_ref: "release".to_string(),
        mergeable_state: None,
        html_url: format!("https://github.com/{owner}/{name}/pull/{number}"),
        title: "Release".to_string(),
        body: None,
    }
}

pub fn commit(message: &str) -> CommitSummary {
    CommitSummary {
        sha: format!("{:040x}", message.len()),
        message: message.to_string(),
    }
}

fn not_found(resource: impl Into<String>) -> GitHubError {
    GitHubError::NotFound {
        resource: resource.into(),
    }
}

fn injected(operation: &'static str, message: &str) -> GitHubError {
    GitHubError::InvalidResponse {
        operation,
        message: message.to_string(),
    }
}

/// Call record for `list_pull_requests`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPrsCall {
    pub repository: String,
    pub head: String,
    pub base: String,
}

/// Call record for `create_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub repository: String,
    pub pr: NewPullRequest,
}

/// Call record for `update_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrCall {
    pub repository: String,
    pub number: u64,
    pub update: PullRequestUpdate,
}

/// Call record for `merge_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub repository: String,
    pub number: u64,
    pub commit_message: String,
}

/// In-memory GitHub that records every call.
///
/// Hand-written rather than generated so tests can inspect the recorded
/// payloads directly.
///
/// Features:
/// - Organizations and users with paged repository listings
/// - Branches, open pull requests and comparisons per repository
/// - Created pull requests become visible to later listings
/// - Error injection per operation
#[derive(Default)]
pub struct MockGitHub {
    next_pr_number: AtomicU64,
    orgs: Mutex<HashMap<String, Account>>,
    users: Mutex<HashMap<String, Account>>,
    repo_pages: Mutex<HashMap<String, Vec<Vec<Repository>>>>,
    branches: Mutex<HashMap<String, Vec<String>>>,
    open_prs: Mutex<HashMap<String, Vec<PullRequestRef>>>,
    comparisons: Mutex<HashMap<String, Vec<CommitSummary>>>,
    mergeable_states: Mutex<HashMap<(String, u64), String>>,
    merge_refusals: Mutex<Vec<(String, u64)>>,
    login: Mutex<String>,
    own_orgs: Mutex<Vec<String>>,
    // Call tracking
    total_calls: AtomicU64,
    list_repo_calls: Mutex<Vec<(String, u32)>>,
    list_pr_calls: Mutex<Vec<ListPrsCall>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_pr_calls: Mutex<Vec<UpdatePrCall>>,
    get_pr_calls: Mutex<Vec<(String, u64)>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    // Error injection
    error_on_get_org: Mutex<Option<GitHubError>>,
    error_on_get_branch: Mutex<Option<String>>,
    error_on_compare: Mutex<Option<String>>,
    error_on_update_pr: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    rate_limit_list_repos: Mutex<bool>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self {
            next_pr_number: AtomicU64::new(100),
            login: Mutex::new("octocat".to_string()),
            ..Self::default()
        }
    }

    // === Setup ===

    /// Register an organization whose repositories are served in `pages`.
    pub fn add_org(&self, login: &str, pages: Vec<Vec<Repository>>) {
        let count = pages.iter().map(Vec::len).sum::<usize>() as u64;
        self.orgs.lock().unwrap().insert(
            login.to_string(),
            Account {
                login: login.to_string(),
                kind: AccountKind::Organization,
                public_repos: count,
                private_repos: 0,
            },
        );
        self.repo_pages.lock().unwrap().insert(login.to_string(), pages);
    }

    /// Register a user whose repositories are served in `pages`.
    pub fn add_user(&self, login: &str, pages: Vec<Vec<Repository>>) {
        let count = pages.iter().map(Vec::len).sum::<usize>() as u64;
        self.users.lock().unwrap().insert(
            login.to_string(),
            Account {
                login: login.to_string(),
                kind: AccountKind::User,
                public_repos: 0,
                private_repos: count,
            },
        );
        self.repo_pages.lock().unwrap().insert(login.to_string(), pages);
    }

    pub fn add_branch(&self, full_name: &str, branch: &str) {
        self.branches
            .lock()
            .unwrap()
            .entry(full_name.to_string())
            .or_default()
            .push(branch.to_string());
    }

    pub fn add_open_pr(&self, full_name: &str, pr: PullRequestRef) {
        self.open_prs
            .lock()
            .unwrap()
            .entry(full_name.to_string())
            .or_default()
            .push(pr);
    }

    pub fn set_commits(&self, full_name: &str, commits: Vec<CommitSummary>) {
        self.comparisons
            .lock()
            .unwrap()
            .insert(full_name.to_string(), commits);
    }

    pub fn set_mergeable_state(&self, full_name: &str, number: u64, state: &str) {
        self.mergeable_states
            .lock()
            .unwrap()
            .insert((full_name.to_string(), number), state.to_string());
    }

    /// Make the merge of this pull request report `merged: false`.
    pub fn refuse_merge(&self, full_name: &str, number: u64) {
        self.merge_refusals
            .lock()
            .unwrap()
            .push((full_name.to_string(), number));
    }

    pub fn set_login(&self, login: &str, orgs: &[&str]) {
        *self.login.lock().unwrap() = login.to_string();
        *self.own_orgs.lock().unwrap() = orgs.iter().map(|o| o.to_string()).collect();
    }

    // === Error injection ===

    pub fn fail_get_org(&self, err: GitHubError) {
        *self.error_on_get_org.lock().unwrap() = Some(err);
    }

    pub fn fail_get_branch(&self, msg: &str) {
        *self.error_on_get_branch.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_compare(&self, msg: &str) {
        *self.error_on_compare.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_update_pr(&self, msg: &str) {
        *self.error_on_update_pr.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    pub fn rate_limit_repo_listing(&self) {
        *self.rate_limit_list_repos.lock().unwrap() = true;
    }

    // === Call inspection ===

    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn list_repo_calls(&self) -> Vec<(String, u32)> {
        self.list_repo_calls.lock().unwrap().clone()
    }

    pub fn list_pr_calls(&self) -> Vec<ListPrsCall> {
        self.list_pr_calls.lock().unwrap().clone()
    }

    pub fn create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn update_pr_calls(&self) -> Vec<UpdatePrCall> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    pub fn get_pr_calls(&self) -> Vec<(String, u64)> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    /// Number of create, edit and merge calls.
    pub fn mutating_calls(&self) -> usize {
        self.create_pr_calls.lock().unwrap().len()
            + self.update_pr_calls.lock().unwrap().len()
            + self.merge_calls.lock().unwrap().len()
    }

    pub fn open_prs(&self, full_name: &str) -> Vec<PullRequestRef> {
        self.open_prs
            .lock()
            .unwrap()
            .get(full_name)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn repo_page(&self, owner: &str, page: u32) -> Result<RepositoryPage, GitHubError> {
        if *self.rate_limit_list_repos.lock().unwrap() {
            return Err(GitHubError::RateLimited);
        }
        self.list_repo_calls
            .lock()
            .unwrap()
            .push((owner.to_string(), page));

        let pages = self.repo_pages.lock().unwrap();
        let pages = pages.get(owner).cloned().unwrap_or_default();
        let index = (page as usize).saturating_sub(1);

        Ok(RepositoryPage {
            repositories: pages.get(index).cloned().unwrap_or_default(),
            has_next: index + 1 < pages.len(),
        })
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn get_org(&self, name: &str) -> Result<Account, GitHubError> {
        self.record();
        if let Some(err) = self.error_on_get_org.lock().unwrap().take() {
            return Err(err);
        }
        self.orgs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("organization {name}")))
    }

    async fn get_user(&self, name: &str) -> Result<Account, GitHubError> {
        self.record();
        self.users
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("user {name}")))
    }

    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        _per_page: u8,
    ) -> Result<RepositoryPage, GitHubError> {
        self.record();
        self.repo_page(org, page)
    }

    async fn list_user_repos(
        &self,
        user: &str,
        page: u32,
        _per_page: u8,
    ) -> Result<RepositoryPage, GitHubError> {
        self.record();
        self.repo_page(user, page)
    }

    async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Branch, GitHubError> {
        self.record();
        if let Some(msg) = self.error_on_get_branch.lock().unwrap().as_deref() {
            return Err(injected("get_branch", msg));
        }

        let full_name = format!("{owner}/{repo}");
        let exists = self
            .branches
            .lock()
            .unwrap()
            .get(&full_name)
            .is_some_and(|branches| branches.iter().any(|b| b == branch));

        if exists {
            Ok(Branch {
                name: branch.to_string(),
                sha: "0".repeat(40),
            })
        } else {
            Err(not_found(format!("branch {branch} of {full_name}")))
        }
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
    ) -> Result<Vec<PullRequestRef>, GitHubError> {
        self.record();
        let full_name = format!("{owner}/{repo}");
        self.list_pr_calls.lock().unwrap().push(ListPrsCall {
            repository: full_name.clone(),
            head: head.to_string(),
            base: base.to_string(),
        });

        let head_branch = head.split_once(':').map_or(head, |(_, branch)| branch);
        Ok(self
            .open_prs(&full_name)
            .into_iter()
            .filter(|pr| pr.head_ref == head_branch && pr.base_ref == base)
            .collect())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequestRef, GitHubError> {
        self.record();
        let full_name = format!("{owner}/{repo}");
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            repository: full_name.clone(),
            pr: pr.clone(),
        });

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let created = PullRequestRef {
            number,
            head_ref: pr.head.clone(),
            base_ref: pr.base.clone(),
            mergeable_state: None,
            html_url: format!("https://github.com/{full_name}/pull/{number}"),
            title: pr.title.clone(),
            body: Some(pr.body.clone()),
        };
        self.add_open_pr(&full_name, created.clone());
        Ok(created)
    }

    async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequestRef, GitHubError> {
        self.record();
        if let Some(msg) = self.error_on_update_pr.lock().unwrap().as_deref() {
            return Err(injected("update_pull_request", msg));
        }

        let full_name = format!("{owner}/{repo}");
        self.update_pr_calls.lock().unwrap().push(UpdatePrCall {
            repository: full_name.clone(),
            number,
            update: update.clone(),
        });

        let mut open = self.open_prs.lock().unwrap();
        let pr = open
            .get_mut(&full_name)
            .and_then(|prs| prs.iter_mut().find(|pr| pr.number == number))
            .ok_or_else(|| not_found(format!("pull request {full_name}#{number}")))?;
        pr.title = update.title.clone();
        pr.body = Some(update.body.clone());
        Ok(pr.clone())
    }

    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        _base: &str,
        _head: &str,
    ) -> Result<Vec<CommitSummary>, GitHubError> {
        self.record();
        if let Some(msg) = self.error_on_compare.lock().unwrap().as_deref() {
            return Err(injected("compare_commits", msg));
        }

        Ok(self
            .comparisons
            .lock()
            .unwrap()
            .get(&format!("{owner}/{repo}"))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestRef, GitHubError> {
        self.record();
        let full_name = format!("{owner}/{repo}");
        self.get_pr_calls
            .lock()
            .unwrap()
            .push((full_name.clone(), number));

        let mut pr = self
            .open_prs(&full_name)
            .into_iter()
            .find(|pr| pr.number == number)
            .ok_or_else(|| not_found(format!("pull request {full_name}#{number}")))?;
        pr.mergeable_state = self
            .mergeable_states
            .lock()
            .unwrap()
            .get(&(full_name, number))
            .cloned();
        Ok(pr)
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        commit_message: &str,
    ) -> Result<MergeOutcome, GitHubError> {
        self.record();
        if let Some(msg) = self.error_on_merge.lock().unwrap().as_deref() {
            return Err(injected("merge_pull_request", msg));
        }

        let full_name = format!("{owner}/{repo}");
        self.merge_calls.lock().unwrap().push(MergeCall {
            repository: full_name.clone(),
            number,
            commit_message: commit_message.to_string(),
        });

        let refused = self
            .merge_refusals
            .lock()
            .unwrap()
            .contains(&(full_name, number));
        Ok(MergeOutcome {
            merged: !refused,
            sha: (!refused).then(|| "f".repeat(40)),
            message: Some(if refused {
                "Pull Request is not mergeable".to_string()
            } else {
                "Pull Request successfully merged".to_string()
            }),
        })
    }

    async fn authenticated_login(&self) -> Result<String, GitHubError> {
        self.record();
        Ok(self.login.lock().unwrap().clone())
    }

    async fn list_own_orgs(&self) -> Result<Vec<String>, GitHubError> {
        self.record();
        Ok(self.own_orgs.lock().unwrap().clone())
    }
}

/// Progress sink that remembers every update.
#[derive(Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<(u64, u64, String)>>,
}

impl RecordingProgress {
    pub fn updates(&self) -> Vec<(u64, u64, String)> {
        self.updates.lock().unwrap().clone()
    }
}

impl train::ProgressSink for RecordingProgress {
    fn on_progress(&self, current: u64, total: u64, label: &str) {
        self.updates
            .lock()
            .unwrap()
            .push((current, total, label.to_string()));
    }
}
