//! Keyed local-clone cache.
//!
//! Fetching commits materializes a clone of the repository under a cache
//! root. The cache is keyed by the repository reference: repeated fetches for
//! the same reference reuse the existing clone instead of re-cloning, and
//! concurrent syncs for the same reference are serialized by a per-reference
//! lock.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use git2::{ErrorClass, ErrorCode, Repository};
use tracing::debug;

use crate::error::FetchError;

pub struct CloneCache {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CloneCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The directory a reference's clone lives in (whether or not it exists yet).
    pub fn local_path(&self, reference: &str) -> PathBuf {
        self.root.join(cache_key(reference))
    }

    /// Open the cached clone for `reference`, cloning it first if absent.
    ///
    /// Holds the reference's lock for the duration of the sync, so two tasks
    /// racing on the same reference cannot clone into the same directory.
    pub fn sync(&self, reference: &str) -> Result<Repository, FetchError> {
        let lock = self.lock_for(reference);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // A filesystem reference that doesn't exist will never clone; classify
        // it as unavailable up front instead of surfacing a cryptic OS error.
        if let Some(local) = as_local_path(reference)
            && !local.exists()
        {
            return Err(FetchError::RepositoryUnavailable {
                reference: reference.to_string(),
                source: git2::Error::new(
                    ErrorCode::NotFound,
                    ErrorClass::Repository,
                    "local repository path does not exist",
                ),
            });
        }

        let path = self.local_path(reference);

        if path.exists() {
            match Repository::open(&path) {
                Ok(repo) => {
                    debug!(reference, path = %path.display(), "Reusing cached clone");
                    return Ok(repo);
                }
                Err(e) => {
                    // Stale or corrupted cache entry, fall through to re-clone
                    debug!(reference, error = %e, "Cached clone unusable, re-cloning");
                    let _ = std::fs::remove_dir_all(&path);
                }
            }
        }

        debug!(reference, path = %path.display(), "Cloning repository");
        Repository::clone(reference, &path).map_err(|e| classify_clone_error(reference, e))
    }

    fn lock_for(&self, reference: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(reference.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Interpret a reference as a filesystem path if it plainly is one.
fn as_local_path(reference: &str) -> Option<PathBuf> {
    if let Some(stripped) = reference.strip_prefix("file://") {
        return Some(PathBuf::from(stripped));
    }
    if reference.starts_with('/') || reference.starts_with("./") || reference.starts_with("../") {
        return Some(PathBuf::from(reference));
    }
    None
}

/// Directory name for a reference: repo name plus a fingerprint of the full
/// reference, so `owner-a/repo` and `owner-b/repo` never collide.
fn cache_key(reference: &str) -> String {
    let name = reference
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(reference)
        .trim_end_matches(".git");

    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '-'
        })
        .collect();

    let mut hasher = DefaultHasher::new();
    reference.hash(&mut hasher);

    let name = if sanitized.is_empty() { "repo" } else { &sanitized };
    format!("{}-{:016x}", name, hasher.finish())
}

/// Map a git2 clone failure onto the fetch error taxonomy.
///
/// Not-found and authentication/certificate failures mean the reference
/// itself is bad or unreachable; everything else is a transport-level fetch
/// failure.
fn classify_clone_error(reference: &str, error: git2::Error) -> FetchError {
    let unavailable = matches!(error.code(), ErrorCode::NotFound | ErrorCode::Auth)
        || matches!(
            error.class(),
            ErrorClass::Http | ErrorClass::Net | ErrorClass::Ssl
        );

    if unavailable {
        FetchError::RepositoryUnavailable {
            reference: reference.to_string(),
            source: error,
        }
    } else {
        FetchError::FetchFailure(error)
    }
}

/// Default cache root: the platform cache directory, falling back to a
/// directory under the system temp dir.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("chronik"))
        .unwrap_or_else(|| std::env::temp_dir().join("chronik"))
}
