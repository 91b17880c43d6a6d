//! Build / Stage - build と stage のレコード
//!
//! reaper から見ると読み取り専用のスナップショットです。遷移メソッド
//! （`start` / `finish` / `kill`）はデータを持つ store と in-memory canceler 用。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BuildId, RepoId, StageId};
use super::status::Status;

/// One pipeline execution.
///
/// Invariant: `started` is `None` while `status` is `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub repo_id: RepoId,
    pub number: u64,
    pub status: Status,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
}

impl Build {
    /// A freshly queued build.
    pub fn pending(id: BuildId, repo_id: RepoId, number: u64, created: DateTime<Utc>) -> Self {
        Self {
            id,
            repo_id,
            number,
            status: Status::Pending,
            created,
            started: None,
            finished: None,
        }
    }

    /// Mark as running.
    pub fn start(&mut self, at: DateTime<Utc>) {
        self.status = Status::Running;
        self.started = Some(at);
    }

    /// Mark as killed. Terminal builds are left untouched.
    pub fn kill(&mut self, at: DateTime<Utc>) {
        if self.status.is_done() {
            return;
        }
        self.status = Status::Killed;
        self.finished = Some(at);
    }
}

/// One unit of work within a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub build_id: BuildId,
    pub number: u32,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
}

impl Stage {
    pub fn pending(id: StageId, build_id: BuildId, number: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            build_id,
            number,
            name: name.into(),
            status: Status::Pending,
            started: None,
            finished: None,
        }
    }

    /// True for any terminal outcome (passing, failing, skipped, killed, ...).
    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn start(&mut self, at: DateTime<Utc>) {
        self.status = Status::Running;
        self.started = Some(at);
    }

    pub fn finish(&mut self, status: Status, at: DateTime<Utc>) {
        self.status = status;
        self.finished = Some(at);
    }

    /// Mark as killed. Finished stages keep their outcome.
    pub fn kill(&mut self, at: DateTime<Utc>) {
        if self.is_done() {
            return;
        }
        self.status = Status::Killed;
        self.finished = Some(at);
    }
}
