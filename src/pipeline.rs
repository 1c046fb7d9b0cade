//! The changelog pipeline: validate → fetch → select → synthesize → assemble.
//!
//! Each stage delegates to an injected collaborator and any stage failure
//! aborts the whole run — no partial changelog ever escapes. This module is
//! the sole translator from component errors into the caller-visible
//! [`PipelineError`] taxonomy; full error detail is logged here and the
//! caller gets a short, sanitized message.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::changelog::{Changelog, ChangelogStore};
use crate::error::PipelineError;
use crate::git::CommitFetcher;
use crate::llm::{TextGenerator, synthesize};
use crate::score::select_significant;

/// A request to generate a changelog.
#[derive(Debug, Clone)]
pub struct ChangelogRequest {
    /// Repository reference: URL, scp-like remote, or filesystem path.
    pub repository: String,
    /// How many commits to fetch, and the selection budget. Must be ≥ 1.
    pub commit_count: usize,
    /// Opaque identifier of the requesting user.
    pub user: String,
}

/// Generation knobs, fixed per pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
        }
    }
}

/// Orchestrates one changelog generation per call. Collaborators are shared
/// handles, so a single pipeline can serve many concurrent runs.
pub struct Pipeline {
    fetcher: Arc<dyn CommitFetcher>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn ChangelogStore>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn CommitFetcher>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn ChangelogStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            generator,
            store,
            config,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn generate(&self, request: &ChangelogRequest) -> Result<Changelog, PipelineError> {
        validate(request)?;

        let repository = request.repository.as_str();
        let commit_count = request.commit_count;
        info!(repository, commit_count, "Generating changelog");

        // Fetch
        let commits = self
            .fetcher
            .fetch(repository, commit_count)
            .await
            .map_err(|e| match e {
                crate::error::FetchError::RepositoryUnavailable { .. } => {
                    error!(stage = "fetch", repository, commit_count, error = %e, "Repository unavailable");
                    PipelineError::InvalidRequest(
                        "repository not found or inaccessible".to_string(),
                    )
                }
                crate::error::FetchError::FetchFailure(_) => {
                    error!(stage = "fetch", repository, commit_count, error = %e, "Fetch failed");
                    PipelineError::UpstreamFailure("failed to read repository history".to_string())
                }
            })?;

        debug!(stage = "select", fetched = commits.len(), budget = commit_count);

        // Select
        let selected = select_significant(commits, commit_count);

        // Synthesize
        let content = synthesize(
            self.generator.as_ref(),
            &selected,
            &self.config.model,
            self.config.temperature,
        )
        .await
        .map_err(|e| {
            error!(stage = "synthesize", repository, commit_count, error = %e, "Generation failed");
            PipelineError::UpstreamFailure("changelog generation failed".to_string())
        })?;

        // Assemble
        let changelog = Changelog::assemble(request, content);

        // Persist, fire-and-forget: a store failure is logged but does not
        // fail a run whose changelog is already assembled.
        if let Err(e) = self.store.create(&changelog).await {
            warn!(stage = "persist", repository, id = %changelog.id, error = %e, "Failed to store changelog");
        }

        info!(repository, id = %changelog.id, "Changelog generated");
        Ok(changelog)
    }
}

/// Check the request before doing any work.
fn validate(request: &ChangelogRequest) -> Result<(), PipelineError> {
    if request.commit_count < 1 {
        return Err(PipelineError::InvalidRequest(
            "commit count must be at least 1".to_string(),
        ));
    }

    let reference = request.repository.trim();
    if reference.is_empty() {
        return Err(PipelineError::InvalidRequest(
            "repository reference must not be empty".to_string(),
        ));
    }

    if !is_plausible_reference(reference) {
        return Err(PipelineError::InvalidRequest(
            "repository reference is not a URL, remote, or path".to_string(),
        ));
    }

    Ok(())
}

/// Syntactic check that a reference could plausibly be reached: a URL, an
/// scp-like remote (`git@host:path`), or a filesystem path.
fn is_plausible_reference(reference: &str) -> bool {
    let re = regex_lite::Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9+.-]*://\S+|\S+@\S+:\S+|\.{0,2}/\S*|[A-Za-z]:\\\S+)$",
    )
    .unwrap();
    re.is_match(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::changelog::store::MockChangelogStore;
    use crate::error::{FetchError, GenerationError};
    use crate::git::RawCommit;
    use crate::git::fetcher::MockCommitFetcher;
    use crate::llm::MockTextGenerator;

    fn request(repository: &str, commit_count: usize) -> ChangelogRequest {
        ChangelogRequest {
            repository: repository.to_string(),
            commit_count,
            user: "tester".to_string(),
        }
    }

    fn commit(subject: &str) -> RawCommit {
        RawCommit {
            hash: "abc123".to_string(),
            author: "Dev".to_string(),
            date: "Mon, 01 Jul 2024 10:00:00 +0000".to_string(),
            subject: subject.to_string(),
            body: String::new(),
        }
    }

    fn pipeline(
        fetcher: MockCommitFetcher,
        generator: MockTextGenerator,
        store: MockChangelogStore,
    ) -> Pipeline {
        Pipeline::new(
            Arc::new(fetcher),
            Arc::new(generator),
            Arc::new(store),
            PipelineConfig::default(),
        )
    }

    // ── Validation ──

    #[test]
    fn test_validate_rejects_zero_commit_count() {
        let result = validate(&request("https://github.com/a/b.git", 0));
        assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
    }

    #[test]
    fn test_validate_rejects_empty_reference() {
        let result = validate(&request("   ", 10));
        assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
    }

    #[test]
    fn test_validate_accepts_common_reference_shapes() {
        for reference in [
            "https://github.com/acme/widgets.git",
            "git@github.com:acme/widgets.git",
            "ssh://git@example.com/repo",
            "file:///srv/git/repo",
            "/srv/git/repo",
            "./relative/repo",
            "../up/one/repo",
        ] {
            assert!(validate(&request(reference, 1)).is_ok(), "rejected {reference}");
        }
    }

    #[test]
    fn test_validate_rejects_free_text() {
        for reference in ["not a repo", "just-words", "http:// broken"] {
            assert!(
                validate(&request(reference, 1)).is_err(),
                "accepted {reference}"
            );
        }
    }

    // ── Stage behavior ──

    #[tokio::test]
    async fn test_unavailable_repository_maps_to_invalid_request() {
        let mut fetcher = MockCommitFetcher::new();
        fetcher.expect_fetch().returning(|reference, _| {
            Err(FetchError::RepositoryUnavailable {
                reference: reference.to_string(),
                source: git2::Error::from_str("not found"),
            })
        });

        // Neither synthesize nor persist may run after a fetch failure
        let mut generator = MockTextGenerator::new();
        generator.expect_complete().times(0);
        let mut store = MockChangelogStore::new();
        store.expect_create().times(0);

        let result = pipeline(fetcher, generator, store)
            .generate(&request("https://github.com/acme/gone.git", 10))
            .await;

        assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_maps_to_upstream_failure() {
        let mut fetcher = MockCommitFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Err(FetchError::FetchFailure(git2::Error::from_str("boom"))));

        let mut generator = MockTextGenerator::new();
        generator.expect_complete().times(0);
        let mut store = MockChangelogStore::new();
        store.expect_create().times(0);

        let result = pipeline(fetcher, generator, store)
            .generate(&request("https://github.com/acme/widgets.git", 10))
            .await;

        assert!(matches!(result, Err(PipelineError::UpstreamFailure(_))));
    }

    #[tokio::test]
    async fn test_generation_failure_maps_to_upstream_failure() {
        let mut fetcher = MockCommitFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(vec![commit("feat: add exports")]));

        let mut generator = MockTextGenerator::new();
        generator
            .expect_complete()
            .returning(|_| Err(GenerationError::EmptyResponse));

        let mut store = MockChangelogStore::new();
        store.expect_create().times(0);

        let result = pipeline(fetcher, generator, store)
            .generate(&request("https://github.com/acme/widgets.git", 10))
            .await;

        assert!(matches!(result, Err(PipelineError::UpstreamFailure(_))));
    }

    #[tokio::test]
    async fn test_successful_run_assembles_and_stores() {
        let mut fetcher = MockCommitFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(vec![commit("feat: add exports"), commit("fix: crash")]));

        let mut generator = MockTextGenerator::new();
        generator
            .expect_complete()
            .returning(|_| Ok("# July 2024\n\n## New Features\n".to_string()));

        let mut store = MockChangelogStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));

        let changelog = pipeline(fetcher, generator, store)
            .generate(&request("https://github.com/acme/widgets.git", 10))
            .await
            .unwrap();

        assert_eq!(changelog.commit_count, 10);
        assert_eq!(changelog.user, "tester");
        assert!(changelog.content.starts_with("# July 2024"));
    }

    #[tokio::test]
    async fn test_store_failure_does_not_fail_the_run() {
        let mut fetcher = MockCommitFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(vec![commit("feat: add exports")]));

        let mut generator = MockTextGenerator::new();
        generator
            .expect_complete()
            .returning(|_| Ok("# July 2024\n".to_string()));

        let mut store = MockChangelogStore::new();
        store.expect_create().returning(|_| {
            Err(crate::error::StoreError::WriteFailed(std::io::Error::other(
                "disk full",
            )))
        });

        let result = pipeline(fetcher, generator, store)
            .generate(&request("https://github.com/acme/widgets.git", 10))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_over_budget_fetch_is_truncated_before_synthesis() {
        let mut fetcher = MockCommitFetcher::new();
        fetcher.expect_fetch().returning(|_, _| {
            Ok((0..8).map(|i| commit(&format!("update module {i}"))).collect())
        });

        let saw_budget = Arc::new(AtomicBool::new(false));
        let saw_budget_clone = saw_budget.clone();

        let mut generator = MockTextGenerator::new();
        generator.expect_complete().returning(move |req| {
            let embedded = req.user_prompt.matches("Commit: ").count();
            saw_budget_clone.store(embedded <= 3, Ordering::SeqCst);
            Ok("# July 2024\n".to_string())
        });

        let mut store = MockChangelogStore::new();
        store.expect_create().returning(|_| Ok(()));

        pipeline(fetcher, generator, store)
            .generate(&request("https://github.com/acme/widgets.git", 3))
            .await
            .unwrap();

        assert!(saw_budget.load(Ordering::SeqCst));
    }
}
