//! chronik - generate user-facing changelogs from git history using an LLM.
//!
//! # Overview
//!
//! chronik fetches recent commits from a repository, scores and truncates
//! them to the most significant subset when they exceed the requested budget,
//! asks an OpenAI-compatible completion endpoint to write a user-facing
//! changelog, and assembles the result into a storable record.

pub mod changelog;
pub mod error;
pub mod git;
pub mod llm;
pub mod pipeline;
pub mod score;

// Re-export commonly used types
pub use changelog::{Changelog, ChangelogStore, FileStore};
pub use error::{FetchError, GenerationError, PipelineError, StoreError};
pub use git::{CloneCache, CommitFetcher, GitFetcher, RawCommit};
pub use llm::{OpenAiClient, TextGenerator};
pub use pipeline::{ChangelogRequest, Pipeline, PipelineConfig};
pub use score::{ScoredCommit, select_significant};
