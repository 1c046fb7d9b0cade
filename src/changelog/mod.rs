//! The assembled changelog record.

pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use store::{ChangelogStore, FileStore, write_markdown};

use crate::pipeline::ChangelogRequest;

/// A generated changelog. Created once per successful pipeline run; the
/// content is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changelog {
    pub id: Uuid,
    pub user: String,
    pub repository: String,
    pub commit_count: usize,
    /// Generated markdown document.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Changelog {
    /// Assemble a changelog record from the originating request and the
    /// synthesized document. Does not persist.
    pub fn assemble(request: &ChangelogRequest, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user: request.user.clone(),
            repository: request.repository.clone(),
            commit_count: request.commit_count,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}
