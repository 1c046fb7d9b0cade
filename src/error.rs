//! Error types for chronik modules using thiserror.

use thiserror::Error;

/// Errors from commit fetching.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Repository '{reference}' not found or inaccessible: {source}")]
    RepositoryUnavailable {
        reference: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to fetch commits: {0}")]
    FetchFailure(#[source] git2::Error),
}

/// Errors from the text-generation capability.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("OPENAI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("Completion request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Completion API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Completion API returned no usable text content")]
    EmptyResponse,

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GenerationError>),
}

/// Errors from changelog persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize changelog: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Caller-visible failure taxonomy.
///
/// The pipeline is the sole translator from component errors into these three
/// kinds. Messages are short and safe to return to a caller; the full
/// component error is logged at the translation site, not carried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Bad input (4xx-equivalent).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Repository or generation capability unavailable (502-equivalent).
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Anything unclassified (500-equivalent).
    #[error("Internal failure: {0}")]
    InternalFailure(String),
}
