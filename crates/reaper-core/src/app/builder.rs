//! ReaperBuilder - reaper の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 設定は構築時に一度だけ決まり、以後変更されない

use std::sync::Arc;
use std::time::Duration;

use crate::app::reaper::Reaper;
use crate::domain::{DEFAULT_BUFFER, Deadlines};
use crate::ports::{BuildStore, Canceler, Clock, RepositoryStore, StageStore, SystemClock};

/// ReaperBuilder は collaborator と deadline から Reaper を構築
///
/// # 使用例
/// ```ignore
/// let reaper = ReaperBuilder::new()
///     .store(Arc::new(store))
///     .canceler(Arc::new(canceler))
///     .pending_deadline(Duration::from_secs(3600))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - store と canceler が揃っていなければ build() が BuildError を返す
/// - deadline が 0 の場合は 24 時間になる
/// - clock を指定しなければ SystemClock
pub struct ReaperBuilder {
    repos: Option<Arc<dyn RepositoryStore>>,
    builds: Option<Arc<dyn BuildStore>>,
    stages: Option<Arc<dyn StageStore>>,
    canceler: Option<Arc<dyn Canceler>>,
    clock: Option<Arc<dyn Clock>>,
    pending_deadline: Duration,
    running_deadline: Duration,
    buffer: Duration,
}

/// BuildError は reaper 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

impl ReaperBuilder {
    pub fn new() -> Self {
        Self {
            repos: None,
            builds: None,
            stages: None,
            canceler: None,
            clock: None,
            pending_deadline: Duration::ZERO,
            running_deadline: Duration::ZERO,
            buffer: DEFAULT_BUFFER,
        }
    }

    /// Use one store for repositories, builds and stages.
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: RepositoryStore + BuildStore + StageStore + 'static,
    {
        self.repositories(store.clone())
            .builds(store.clone())
            .stages(store)
    }

    pub fn repositories(mut self, repos: Arc<dyn RepositoryStore>) -> Self {
        self.repos = Some(repos);
        self
    }

    pub fn builds(mut self, builds: Arc<dyn BuildStore>) -> Self {
        self.builds = Some(builds);
        self
    }

    pub fn stages(mut self, stages: Arc<dyn StageStore>) -> Self {
        self.stages = Some(stages);
        self
    }

    pub fn canceler(mut self, canceler: Arc<dyn Canceler>) -> Self {
        self.canceler = Some(canceler);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// How long a build may stay queued. Zero means 24 hours.
    pub fn pending_deadline(mut self, deadline: Duration) -> Self {
        self.pending_deadline = deadline;
        self
    }

    /// How long a build may run before its stages are inspected. Zero means 24 hours.
    pub fn running_deadline(mut self, deadline: Duration) -> Self {
        self.running_deadline = deadline;
        self
    }

    pub fn buffer(mut self, buffer: Duration) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn deadlines(self, deadlines: Deadlines) -> Self {
        self.pending_deadline(deadlines.pending)
            .running_deadline(deadlines.running)
            .buffer(deadlines.buffer)
    }

    pub fn build(self) -> Result<Reaper, BuildError> {
        Ok(Reaper {
            repos: self
                .repos
                .ok_or(BuildError::MissingCollaborator("repository store"))?,
            builds: self
                .builds
                .ok_or(BuildError::MissingCollaborator("build store"))?,
            stages: self
                .stages
                .ok_or(BuildError::MissingCollaborator("stage store"))?,
            canceler: self
                .canceler
                .ok_or(BuildError::MissingCollaborator("canceler"))?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            deadlines: Deadlines::new(self.pending_deadline, self.running_deadline, self.buffer),
        })
    }
}

impl Default for ReaperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_DEADLINE;
    use crate::impls::{InMemoryCanceler, InMemoryStore};

    #[test]
    fn test_build_success() {
        let store = InMemoryStore::new();
        let reaper = ReaperBuilder::new()
            .store(Arc::new(store.clone()))
            .canceler(Arc::new(InMemoryCanceler::new(store)))
            .pending_deadline(Duration::from_secs(3600))
            .build()
            .unwrap();

        assert_eq!(reaper.deadlines().pending, Duration::from_secs(3600));
        assert_eq!(reaper.deadlines().running, DEFAULT_DEADLINE);
        assert_eq!(reaper.deadlines().buffer, DEFAULT_BUFFER);
    }

    #[test]
    fn test_build_missing_canceler() {
        let reaper = ReaperBuilder::new()
            .store(Arc::new(InMemoryStore::new()))
            .build();
        assert!(matches!(
            reaper,
            Err(BuildError::MissingCollaborator("canceler"))
        ));
    }

    #[test]
    fn test_build_missing_stage_store() {
        let store = InMemoryStore::new();
        let reaper = ReaperBuilder::new()
            .repositories(Arc::new(store.clone()))
            .builds(Arc::new(store.clone()))
            .canceler(Arc::new(InMemoryCanceler::new(store)))
            .build();
        assert!(matches!(
            reaper,
            Err(BuildError::MissingCollaborator("stage store"))
        ));
    }

    #[test]
    fn test_deadlines_are_normalised() {
        let store = InMemoryStore::new();
        let reaper = ReaperBuilder::new()
            .store(Arc::new(store.clone()))
            .canceler(Arc::new(InMemoryCanceler::new(store)))
            .deadlines(Deadlines {
                pending: Duration::ZERO,
                running: Duration::from_secs(7200),
                buffer: Duration::from_secs(300),
            })
            .build()
            .unwrap();

        assert_eq!(
            *reaper.deadlines(),
            Deadlines::new(DEFAULT_DEADLINE, Duration::from_secs(7200), Duration::from_secs(300))
        );
    }
}
