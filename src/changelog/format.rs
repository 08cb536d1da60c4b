//! Changelog categories and the release pull request body built from them.

use std::fmt::Write;

/// Changelog categories per Keep a Changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangelogCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl ChangelogCategory {
    /// Every category, in the order they are evaluated and rendered.
    pub const ALL: [ChangelogCategory; 6] = [
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Removed,
        Self::Fixed,
        Self::Security,
    ];

    /// Lowercase name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Deprecated => "deprecated",
            Self::Removed => "removed",
            Self::Fixed => "fixed",
            Self::Security => "security",
        }
    }

    /// Uppercase label used in pull request bodies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Changed => "CHANGED",
            Self::Deprecated => "DEPRECATED",
            Self::Removed => "REMOVED",
            Self::Fixed => "FIXED",
            Self::Security => "SECURITY",
        }
    }

    pub fn order(&self) -> u8 {
        match self {
            Self::Added => 0,
            Self::Changed => 1,
            Self::Deprecated => 2,
            Self::Removed => 3,
            Self::Fixed => 4,
            Self::Security => 5,
        }
    }
}

impl std::fmt::Display for ChangelogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title of every release pull request.
pub const RELEASE_TITLE: &str = "Release";

/// Body used when no commit matched any rule.
pub const EMPTY_CHANGELOG_NOTICE: &str =
    "no change log detected &mdash; try favoring words like `added`, `changed`, or `removed`\n";

/// Appended to every release pull request body.
pub const BODY_FOOTER: &str = "\n----\nRelease PR created with `train`";

/// Entries grouped by category, each group in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    groups: [Vec<String>; 6],
}

impl Changelog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: ChangelogCategory, entry: impl Into<String>) {
        self.groups[usize::from(category.order())].push(entry.into());
    }

    pub fn entries(&self, category: ChangelogCategory) -> &[String] {
        &self.groups[usize::from(category.order())]
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Non-empty groups in category order.
    pub fn entries_by_category(&self) -> impl Iterator<Item = (ChangelogCategory, &[String])> {
        ChangelogCategory::ALL
            .into_iter()
            .map(|category| (category, self.entries(category)))
            .filter(|(_, entries)| !entries.is_empty())
    }

    /// Render the release pull request body.
    pub fn render_body(&self) -> String {
        let mut body = String::new();
        for (category, entries) in self.entries_by_category() {
            for entry in entries {
                let _ = writeln!(body, "* `{}` {}", category.label(), entry);
            }
        }

        if body.is_empty() {
            body.push_str(EMPTY_CHANGELOG_NOTICE);
        }
        body.push_str(BODY_FOOTER);
        body
    }
}
