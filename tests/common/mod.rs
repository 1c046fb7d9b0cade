//! Shared test utilities for integration tests.
//!
//! Not all helpers are used by every test file.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature, Time};

use chronik::git::RawCommit;

/// A throwaway git repository with a linear history, used as a fetch source.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    commit_count: std::cell::Cell<i64>,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self {
            dir,
            repo,
            commit_count: std::cell::Cell::new(0),
        }
    }

    /// The repository reference a fetcher would use.
    pub fn reference(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit signature with a strictly increasing timestamp, so ordering by
    /// time is unambiguous even when commits are created within one second.
    fn signature(&self) -> Signature<'_> {
        let n = self.commit_count.get();
        self.commit_count.set(n + 1);
        let time = Time::new(1_720_000_000 + n * 60, 0);
        Signature::new("Test User", "test@example.com", &time)
            .expect("Failed to create signature")
    }

    /// Create a commit with a subject line only. Returns the commit OID.
    pub fn commit(&self, subject: &str) -> Oid {
        self.commit_with_body(subject, "")
    }

    /// Create a commit with a subject and body. Returns the commit OID.
    pub fn commit_with_body(&self, subject: &str, body: &str) -> Oid {
        let sig = self.signature();

        let message = if body.is_empty() {
            subject.to_string()
        } else {
            format!("{subject}\n\n{body}")
        };

        // Each commit touches the same file with unique content
        let file_path = self.dir.path().join("notes.txt");
        std::fs::write(&file_path, format!("{}\n{}", subject, self.commit_count.get()))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new("notes.txt"))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, &message, &tree, &parents)
            .expect("Failed to create commit")
    }
}

/// Build an in-memory commit without touching git at all.
pub fn raw_commit(hash: &str, subject: &str, body: &str) -> RawCommit {
    RawCommit {
        hash: hash.to_string(),
        author: "Test User".to_string(),
        date: "Mon, 01 Jul 2024 10:00:00 +0000".to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
    }
}
