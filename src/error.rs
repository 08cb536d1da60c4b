//! Error types for train modules using thiserror.

use thiserror::Error;

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no token found. Set github.token in the train config, export TRAIN_GHTOKEN or GITHUB_TOKEN, or run 'gh auth login'"
    )]
    AuthenticationFailed,

    #[error("Failed to build GitHub client: {0}")]
    Client(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API")]
    RateLimited,

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("GitHub request '{operation}' failed: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("GitHub request '{operation}' returned an unexpected response: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },
}

impl GitHubError {
    /// Classify an octocrab error for the given operation.
    ///
    /// octocrab surfaces GitHub's message in the error text rather than a stable
    /// variant, so both the Display and Debug output are inspected.
    pub fn from_octocrab(operation: &'static str, resource: &str, err: octocrab::Error) -> Self {
        let display = err.to_string().to_lowercase();
        let debug = format!("{:?}", err).to_lowercase();

        if display.contains("rate limit") || debug.contains("rate limit") {
            return Self::RateLimited;
        }
        // GitHub says "Not Found" for most resources and "Branch not found" for branches.
        if display.contains("not found") || debug.contains("not found") {
            return Self::NotFound {
                resource: resource.to_string(),
            };
        }

        Self::Request {
            operation,
            source: Box::new(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the release-train engine.
///
/// `NoReleaseBranch` and `NoCommits` are scoped to a single repository and are
/// absorbed by the batch as skips; every other variant aborts the run.
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("github: hit rate limit")]
    RateLimited,

    #[error("no organization or user named '{0}'")]
    EntityNotFound(String),

    #[error("no repos found for '{0}'")]
    NoReposFound(String),

    #[error("{repository}: release branch '{branch}' does not exist")]
    NoReleaseBranch { repository: String, branch: String },

    #[error("{repository}: no commits between {base} and {head}")]
    NoCommits {
        repository: String,
        base: String,
        head: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{operation}: {source}")]
    GitHub {
        operation: String,
        #[source]
        source: GitHubError,
    },
}

impl TrainError {
    /// Wrap an API error with the engine operation it happened in.
    ///
    /// Rate limiting keeps its own variant so callers can report it plainly.
    pub fn github(operation: impl Into<String>, source: GitHubError) -> Self {
        match source {
            GitHubError::RateLimited => Self::RateLimited,
            source => Self::GitHub {
                operation: operation.into(),
                source,
            },
        }
    }

    /// Whether the batch should record this as a skipped repository and keep going.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::NoReleaseBranch { .. } | Self::NoCommits { .. })
    }
}

/// Errors from reading, validating or writing the train config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unrecognized config field: {0}")]
    UnknownField(String),

    #[error("Invalid rate limits: {0}")]
    InvalidLimits(String),
}
