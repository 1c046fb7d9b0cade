//! Changelog persistence.
//!
//! The pipeline only needs a fire-and-forget `create` after assembly; the
//! shipped implementation writes one JSON document per changelog under a
//! directory. Writes go through a temp file in the target directory and are
//! persisted atomically, so a crash never leaves a half-written record.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;

use super::Changelog;

/// Trait for the persistence collaborator.
///
/// This abstraction allows mocking the store in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangelogStore: Send + Sync {
    /// Persist a newly assembled changelog.
    async fn create(&self, changelog: &Changelog) -> Result<(), StoreError>;
}

/// Directory-backed store: `<root>/<id>.json`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, changelog: &Changelog) -> PathBuf {
        self.root.join(format!("{}.json", changelog.id))
    }
}

#[async_trait]
impl ChangelogStore for FileStore {
    async fn create(&self, changelog: &Changelog) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(StoreError::WriteFailed)?;

        let json =
            serde_json::to_string_pretty(changelog).map_err(StoreError::SerializeFailed)?;

        let path = self.path_for(changelog);
        atomic_write(&path, json.as_bytes()).map_err(StoreError::WriteFailed)?;

        debug!(id = %changelog.id, path = %path.display(), "Stored changelog");
        Ok(())
    }
}

/// Write the changelog's markdown content to `path` atomically.
pub fn write_markdown(path: &Path, changelog: &Changelog) -> Result<(), StoreError> {
    atomic_write(path, changelog.content.as_bytes()).map_err(StoreError::WriteFailed)
}

/// Write through a named temp file in the destination directory, then rename
/// into place.
fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
