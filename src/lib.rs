//! train - A CLI tool that drives release pull requests across a GitHub org or user.
//!
//! # Overview
//!
//! For every repository of an organization or user, train compares the release
//! branch with the default branch, turns the commits in between into a
//! keyword-classified changelog, and opens or refreshes a single "Release" pull
//! request. A later release pass merges the release pull requests GitHub
//! reports as clean.

pub mod cancel;
pub mod changelog;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod locator;
pub mod progress;
pub mod release;
pub mod throttle;

// Re-export commonly used types
pub use cancel::{CancelHandle, CancelToken};
pub use changelog::{Changelog, ChangelogCategory};
pub use config::Config;
pub use context::{ReleaseSession, TrainContext};
pub use error::{ConfigError, GitHubError, TrainError};
pub use github::{GitHubApi, OctocrabApi, PullRequestRef, Repository};
pub use progress::{LogProgress, NoopProgress, ProgressSink, SharedProgress};
pub use release::{CreateReport, ReleaseCandidate, Skipped};
pub use throttle::RateLimiter;
