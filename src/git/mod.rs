//! Git operations using git2-rs.

pub mod cache;
pub mod commits;
pub mod fetcher;

pub use cache::{CloneCache, default_cache_root};
pub use commits::{RawCommit, read_commits};
pub use fetcher::{CommitFetcher, GitFetcher};
