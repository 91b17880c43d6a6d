//! StageStore port - build に属する stage の一覧

use async_trait::async_trait;

use crate::domain::{BuildId, Stage, StoreError};

#[async_trait]
pub trait StageStore: Send + Sync {
    /// Stages of one build, ordered by stage number.
    async fn list_by_build(&self, build_id: BuildId) -> Result<Vec<Stage>, StoreError>;
}
