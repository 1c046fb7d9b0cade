//! The commit-fetching seam used by the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;

use super::cache::CloneCache;
use super::commits::{RawCommit, read_commits};

/// Trait for fetching commits for a repository reference.
///
/// This abstraction allows mocking the repository source in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitFetcher: Send + Sync {
    /// Fetch up to `count` commits for `reference`, newest first.
    async fn fetch(&self, reference: &str, count: usize) -> Result<Vec<RawCommit>, FetchError>;
}

/// Default fetcher backed by git2 and the local-clone cache.
pub struct GitFetcher {
    cache: Arc<CloneCache>,
}

impl GitFetcher {
    pub fn new(cache: Arc<CloneCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CommitFetcher for GitFetcher {
    async fn fetch(&self, reference: &str, count: usize) -> Result<Vec<RawCommit>, FetchError> {
        let repo = self.cache.sync(reference)?;
        let commits = read_commits(&repo, count)?;
        debug!(reference, fetched = commits.len(), "Fetched commits");
        Ok(commits)
    }
}
