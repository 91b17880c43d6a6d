//! RepositoryStore port - repository の読み出し

use async_trait::async_trait;

use crate::domain::{RepoId, Repository, StoreError};

/// RepositoryStore は build の所有者を解決する
///
/// 見つからない場合は `StoreError::NotFound` を返す。reaper はこれを
/// hard error として扱い、その build は reap しない。
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn find(&self, id: RepoId) -> Result<Repository, StoreError>;
}
