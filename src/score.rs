//! Commit significance scoring and selection.
//!
//! When a fetch returns more commits than the requested budget, commits are
//! ranked by an integer heuristic and truncated to the highest-scoring
//! subset. The heuristic is intentionally simple: message length plus flat
//! bonuses/penalties for keyword substrings. Matching is case-insensitive and
//! overlapping ("fix" also hits inside "fixed"), and bonuses are additive per
//! vocabulary entry, uncapped. Scores can go negative.

use crate::git::RawCommit;

/// Bonus added per significance keyword found in the message.
const KEYWORD_BONUS: i64 = 10;

/// Penalty subtracted per triviality keyword found in the message.
const TRIVIAL_PENALTY: i64 = 15;

/// Keywords that mark a commit as likely user-relevant. Morphological
/// variants are separate entries on purpose: a message hitting several of
/// them earns several bonuses.
const SIGNIFICANT_KEYWORDS: &[&str] = &[
    "add",
    "added",
    "adding",
    "feature",
    "featured",
    "refactor",
    "refactored",
    "refactoring",
    "improve",
    "improved",
    "fix",
    "fixed",
    "implement",
    "implemented",
    "update",
    "updated",
    "updates",
    "support",
    "supported",
    "merge",
    "merged",
    "merging",
];

/// Keywords that mark a commit as likely noise.
const TRIVIAL_KEYWORDS: &[&str] = &[
    "patch",
    "minor",
    "typo",
    "typos",
    "whitespace",
    "comment",
    "comments",
    "commented",
    "format",
    "formatting",
    "spacing",
    "lint",
    "linting",
];

/// A commit paired with its significance score. Derived on demand, never
/// persisted.
#[derive(Debug, Clone)]
pub struct ScoredCommit {
    pub commit: RawCommit,
    pub score: i64,
}

/// Compute the significance score for a single commit.
///
/// Base score is the character count of `subject + body`; each keyword entry
/// found as a substring adjusts it by a flat amount.
pub fn score_commit(commit: &RawCommit) -> i64 {
    let text = format!("{}{}", commit.subject, commit.body);
    let lowered = text.to_lowercase();

    let mut score = text.chars().count() as i64;

    for keyword in SIGNIFICANT_KEYWORDS {
        if lowered.contains(keyword) {
            score += KEYWORD_BONUS;
        }
    }

    for keyword in TRIVIAL_KEYWORDS {
        if lowered.contains(keyword) {
            score -= TRIVIAL_PENALTY;
        }
    }

    score
}

/// Score every commit, preserving input order.
pub fn score_commits(commits: &[RawCommit]) -> Vec<ScoredCommit> {
    commits
        .iter()
        .map(|commit| ScoredCommit {
            commit: commit.clone(),
            score: score_commit(commit),
        })
        .collect()
}

/// Reduce `commits` to at most `max_count` entries.
///
/// Within budget the input passes through untouched — same commits, same
/// order, no scoring. Over budget, commits are stably sorted by descending
/// score (ties keep fetch order) and truncated, so the output is ordered by
/// score. Deterministic for identical input.
pub fn select_significant(commits: Vec<RawCommit>, max_count: usize) -> Vec<RawCommit> {
    if commits.len() <= max_count {
        return commits;
    }

    let mut scored = score_commits(&commits);
    // sort_by is stable, which is what gives ties their fetch-order tiebreak
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(max_count);

    scored.into_iter().map(|s| s.commit).collect()
}
