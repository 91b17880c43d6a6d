//! BuildStore port - sweep 候補の一覧

use async_trait::async_trait;

use crate::domain::{Build, StoreError};

/// BuildStore は Pending / Running の build を列挙する
///
/// # 設計原則
/// - 返す順序は実装次第（reaper は順序に依存しない）
/// - 一覧取得から評価までの間に build が終了していることがある
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Builds currently queued.
    async fn pending(&self) -> Result<Vec<Build>, StoreError>;

    /// Builds currently executing.
    async fn running(&self) -> Result<Vec<Build>, StoreError>;
}
