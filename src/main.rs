//! chronik - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chronik::changelog::{Changelog, ChangelogStore, FileStore, write_markdown};
use chronik::error::StoreError;
use chronik::git::{CloneCache, GitFetcher, default_cache_root};
use chronik::llm::OpenAiClient;
use chronik::pipeline::{ChangelogRequest, Pipeline, PipelineConfig};

/// Generate a user-facing changelog from a repository's recent commits.
#[derive(Parser, Debug)]
#[command(name = "chronik")]
#[command(about = "Generate a changelog from git history using an LLM")]
#[command(version)]
struct Cli {
    /// Repository reference: URL, scp-like remote, or local path
    repository: String,

    /// Number of commits to fetch and summarize
    #[arg(short = 'n', long = "commits", default_value_t = 50)]
    commits: usize,

    /// Completion model to use
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.5)]
    temperature: f32,

    /// Opaque identifier of the requesting user
    #[arg(long, default_value = "cli")]
    user: String,

    /// Write the generated markdown to this file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Directory where assembled changelog records are stored
    #[arg(long, default_value = "changelogs")]
    store_dir: PathBuf,

    /// Directory for cached repository clones
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Print the changelog without persisting anything
    #[arg(long)]
    dry_run: bool,
}

/// Store used for --dry-run: accepts everything, writes nothing.
struct NullStore;

#[async_trait]
impl ChangelogStore for NullStore {
    async fn create(&self, _changelog: &Changelog) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // The completion client is built exactly once and shared; it owns the
    // 30-second timeout and 3-attempt retry policy.
    let generator = Arc::new(
        OpenAiClient::from_env().context("Failed to configure the completion client")?,
    );

    let cache_root = cli.cache_dir.clone().unwrap_or_else(default_cache_root);
    let fetcher = Arc::new(GitFetcher::new(Arc::new(CloneCache::new(cache_root))));

    let store: Arc<dyn ChangelogStore> = if cli.dry_run {
        Arc::new(NullStore)
    } else {
        Arc::new(FileStore::new(&cli.store_dir))
    };

    let pipeline = Pipeline::new(
        fetcher,
        generator,
        store,
        PipelineConfig {
            model: cli.model.clone(),
            temperature: cli.temperature,
        },
    );

    let request = ChangelogRequest {
        repository: cli.repository.clone(),
        commit_count: cli.commits,
        user: cli.user.clone(),
    };

    let changelog = pipeline
        .generate(&request)
        .await
        .context("Changelog generation failed")?;

    match (&cli.output, cli.dry_run) {
        (Some(path), false) => {
            write_markdown(path, &changelog)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote changelog {} to {}", changelog.id, path.display());
        }
        _ => println!("{}", changelog.content),
    }

    Ok(())
}
