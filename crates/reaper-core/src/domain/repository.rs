//! Repository - repository ごとの実行 timeout

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ids::RepoId;

/// Fallback execution timeout used when a repository carries none.
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 60;

/// Owner of builds.
///
/// `timeout_minutes` is the repository's own execution window. The reaper
/// compares a running build's stage timeline against it, not against the
/// global running deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepoId,
    pub slug: String,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u32,
}

fn default_timeout_minutes() -> u32 {
    DEFAULT_TIMEOUT_MINUTES
}

impl Repository {
    pub fn new(id: RepoId, slug: impl Into<String>, timeout_minutes: u32) -> Self {
        Self {
            id,
            slug: slug.into(),
            timeout_minutes,
        }
    }

    /// Execution timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_minutes) * 60)
    }
}
