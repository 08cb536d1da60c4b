//! Release pull request reconciliation and merging.

pub mod batch;
pub mod merge;
pub mod reconcile;

pub use batch::{CreateReport, Skipped, collect_release_prs, create_releases, process_repos, release_repos};
pub use merge::{MERGE_MESSAGE, ReleaseCandidate, is_clean, release_prs};
pub use reconcile::{compare_url, reconcile_repository};
