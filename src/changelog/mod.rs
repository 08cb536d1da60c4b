//! Commit classification and release body rendering.

pub mod classify;
pub mod format;
pub mod rules;

pub use classify::classify_commits;
pub use format::{BODY_FOOTER, Changelog, ChangelogCategory, EMPTY_CHANGELOG_NOTICE, RELEASE_TITLE};
pub use rules::{ClassificationRule, RULES, classify_line};
