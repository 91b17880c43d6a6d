//! Canceler port - build の取り消し
//!
//! worker の停止通知などの実際の teardown はこの port の向こう側の責務です。

use async_trait::async_trait;

use crate::domain::{Build, CancelError, Repository};

/// Canceler は build とその全 stage を killed にする
///
/// # 設計原則
/// - トランザクショナル: 全部反映されるか、何も変わらずに失敗する
/// - 冪等: すでに終了した build に対しては何もしない
/// - reaper は cancel 直前に status を再確認しない
#[async_trait]
pub trait Canceler: Send + Sync {
    async fn cancel(&self, repo: &Repository, build: &Build) -> Result<(), CancelError>;
}
