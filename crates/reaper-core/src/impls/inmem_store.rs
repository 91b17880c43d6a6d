//! InMemoryStore - 開発用の repository / build / stage store
//!
//! # 学習ポイント
//! - 1 つの Mutex で全 record を守る（cancel がトランザクショナルになる）
//! - clone した InMemoryStore は同じ状態を共有する

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{Build, BuildId, RepoId, Repository, Stage, Status, StoreError};
use crate::ports::{BuildStore, RepositoryStore, StageStore};

/// In-memory store state.
#[derive(Default)]
struct InMemoryStoreState {
    repos: HashMap<RepoId, Repository>,

    /// Builds in insertion order.
    builds: Vec<Build>,

    /// Stages in insertion order.
    stages: Vec<Stage>,
}

impl InMemoryStoreState {
    fn builds_with_status(&self, status: Status) -> Vec<Build> {
        self.builds
            .iter()
            .filter(|build| build.status == status)
            .cloned()
            .collect()
    }

    /// Mark the build and its unfinished stages killed.
    fn kill_build(&mut self, build_id: BuildId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let build = self
            .builds
            .iter_mut()
            .find(|build| build.id == build_id)
            .ok_or_else(|| StoreError::not_found("build", build_id))?;
        if build.status.is_done() {
            return Ok(false);
        }
        build.kill(at);
        for stage in self.stages.iter_mut().filter(|stage| stage.build_id == build_id) {
            stage.kill(at);
        }
        Ok(true)
    }
}

/// In-memory store implementing every store port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<InMemoryStoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_repo(&self, repo: Repository) {
        self.state.lock().await.repos.insert(repo.id, repo);
    }

    /// Insert or replace a build.
    pub async fn insert_build(&self, build: Build) {
        let mut state = self.state.lock().await;
        match state.builds.iter_mut().find(|b| b.id == build.id) {
            Some(existing) => *existing = build,
            None => state.builds.push(build),
        }
    }

    /// Insert or replace a stage.
    pub async fn insert_stage(&self, stage: Stage) {
        let mut state = self.state.lock().await;
        match state.stages.iter_mut().find(|s| s.id == stage.id) {
            Some(existing) => *existing = stage,
            None => state.stages.push(stage),
        }
    }

    pub async fn build(&self, build_id: BuildId) -> Option<Build> {
        let state = self.state.lock().await;
        state.builds.iter().find(|b| b.id == build_id).cloned()
    }

    pub async fn builds(&self) -> Vec<Build> {
        self.state.lock().await.builds.clone()
    }

    /// Number of builds per status.
    pub async fn counts_by_status(&self) -> HashMap<Status, usize> {
        let state = self.state.lock().await;
        let mut counts = HashMap::new();
        for build in &state.builds {
            *counts.entry(build.status).or_insert(0) += 1;
        }
        counts
    }

    /// Kill a build and its unfinished stages under a single lock.
    ///
    /// Returns `Ok(false)` when the build had already finished.
    pub async fn kill_build(&self, build_id: BuildId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.state.lock().await.kill_build(build_id, at)
    }
}

#[async_trait]
impl RepositoryStore for InMemoryStore {
    async fn find(&self, id: RepoId) -> Result<Repository, StoreError> {
        let state = self.state.lock().await;
        state
            .repos
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("repository", id))
    }
}

#[async_trait]
impl BuildStore for InMemoryStore {
    async fn pending(&self) -> Result<Vec<Build>, StoreError> {
        Ok(self.state.lock().await.builds_with_status(Status::Pending))
    }

    async fn running(&self) -> Result<Vec<Build>, StoreError> {
        Ok(self.state.lock().await.builds_with_status(Status::Running))
    }
}

#[async_trait]
impl StageStore for InMemoryStore {
    async fn list_by_build(&self, build_id: BuildId) -> Result<Vec<Stage>, StoreError> {
        let state = self.state.lock().await;
        let mut stages: Vec<Stage> = state
            .stages
            .iter()
            .filter(|stage| stage.build_id == build_id)
            .cloned()
            .collect();
        stages.sort_by_key(|stage| stage.number);
        Ok(stages)
    }
}
