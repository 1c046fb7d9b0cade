//! Raw commit extraction from a git repository.

use chrono::{FixedOffset, TimeZone, Utc};
use git2::{Commit, Repository, Sort};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A single commit as fetched from history.
///
/// `date` is kept as a rendered string (git-log style, RFC 2822 with the
/// author's offset) and never parsed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    pub hash: String,
    pub author: String,
    pub date: String,
    /// First line of the commit message.
    pub subject: String,
    /// Remaining lines of the message, may be empty.
    pub body: String,
}

impl RawCommit {
    /// Create a RawCommit from a git2 Commit.
    pub fn from_git2_commit(commit: &Commit) -> Self {
        let hash = commit.id().to_string();
        let author = commit.author().name().unwrap_or("").to_string();
        let date = format_commit_time(commit);

        let message = commit.message().unwrap_or("");
        let (subject, body) = split_message(message);

        Self {
            hash,
            author,
            date,
            subject,
            body,
        }
    }
}

/// Split a commit message into subject (first line) and body (the rest).
pub fn split_message(message: &str) -> (String, String) {
    let mut lines = message.lines();
    let subject = lines.next().unwrap_or("").to_string();
    let body = lines.collect::<Vec<_>>().join("\n");
    // Drop the blank separator line between subject and body
    let body = body.trim_start_matches('\n').to_string();
    (subject, body)
}

/// Render a commit timestamp in the author's offset, RFC 2822.
fn format_commit_time(commit: &Commit) -> String {
    let time = commit.time();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());

    match Utc.timestamp_opt(time.seconds(), 0).single() {
        Some(utc) => utc.with_timezone(&offset).to_rfc2822(),
        None => time.seconds().to_string(),
    }
}

/// Walk history from HEAD and return up to `count` commits, newest first.
pub fn read_commits(repo: &Repository, count: usize) -> Result<Vec<RawCommit>, FetchError> {
    let mut revwalk = repo.revwalk().map_err(FetchError::FetchFailure)?;
    revwalk.push_head().map_err(FetchError::FetchFailure)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(FetchError::FetchFailure)?;

    let mut commits = Vec::with_capacity(count);

    for oid_result in revwalk {
        if commits.len() >= count {
            break;
        }
        let oid = oid_result.map_err(FetchError::FetchFailure)?;
        let commit = repo.find_commit(oid).map_err(FetchError::FetchFailure)?;
        commits.push(RawCommit::from_git2_commit(&commit));
    }

    Ok(commits)
}
