//! Keyword rules that bucket a commit subject into a changelog category.

use super::format::ChangelogCategory;

/// A keyword and the category it files matching lines under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    pub keyword: &'static str,
    pub category: ChangelogCategory,
}

const fn rule(keyword: &'static str, category: ChangelogCategory) -> ClassificationRule {
    ClassificationRule { keyword, category }
}

/// Evaluated top to bottom; the first hit wins.
///
/// Categories appear in changelog order. Within a category a keyword precedes
/// any shorter keyword that is its prefix.
pub const RULES: &[ClassificationRule] = &[
    rule("added", ChangelogCategory::Added),
    rule("adding", ChangelogCategory::Added),
    rule("adds", ChangelogCategory::Added),
    rule("add", ChangelogCategory::Added),
    rule("created", ChangelogCategory::Added),
    rule("creating", ChangelogCategory::Added),
    rule("altering", ChangelogCategory::Changed),
    rule("changed", ChangelogCategory::Changed),
    rule("changes", ChangelogCategory::Changed),
    rule("changing", ChangelogCategory::Changed),
    rule("change", ChangelogCategory::Changed),
    rule("converted", ChangelogCategory::Changed),
    rule("converting", ChangelogCategory::Changed),
    rule("convert", ChangelogCategory::Changed),
    rule("replaced", ChangelogCategory::Changed),
    rule("replacing", ChangelogCategory::Changed),
    rule("replace", ChangelogCategory::Changed),
    rule("updating", ChangelogCategory::Changed),
    rule("update", ChangelogCategory::Changed),
    rule("deprecated", ChangelogCategory::Deprecated),
    rule("deprecating", ChangelogCategory::Deprecated),
    rule("deprecate", ChangelogCategory::Deprecated),
    rule("detached", ChangelogCategory::Removed),
    rule("detaching", ChangelogCategory::Removed),
    rule("detach", ChangelogCategory::Removed),
    rule("removed", ChangelogCategory::Removed),
    rule("removes", ChangelogCategory::Removed),
    rule("removing", ChangelogCategory::Removed),
    rule("remove", ChangelogCategory::Removed),
    rule("corrected", ChangelogCategory::Fixed),
    rule("correcting", ChangelogCategory::Fixed),
    rule("correct", ChangelogCategory::Fixed),
    rule("fixed", ChangelogCategory::Fixed),
    rule("fixing", ChangelogCategory::Fixed),
    rule("resolved", ChangelogCategory::Fixed),
    rule("resolving", ChangelogCategory::Fixed),
    rule("security", ChangelogCategory::Security),
    rule("securing", ChangelogCategory::Security),
];

/// Subjects containing this are merge commits and never classified.
const MERGE_MARKER: &str = "merge pull request";

/// Classify the first line of a commit message.
///
/// A line starting with the keyword is recorded without its first word; a line
/// merely containing it is recorded whole. Both forms are tried for a rule
/// before moving on to the next. Returns `None` for merge commits and for lines
/// no rule matches.
pub fn classify_line(message: &str) -> Option<(ChangelogCategory, String)> {
    let line = message.lines().next().unwrap_or_default().trim().to_lowercase();
    if line.is_empty() || line.contains(MERGE_MARKER) {
        return None;
    }

    for rule in RULES {
        if line.starts_with(rule.keyword) {
            let rest = line
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim_start())
                .unwrap_or_default();
            return Some((rule.category, rest.to_string()));
        }
        if line.contains(rule.keyword) {
            return Some((rule.category, line));
        }
    }

    None
}
