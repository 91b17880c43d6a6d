//! Reaper - 期限切れ build の判定と cancel
//!
//! sweep loop が「期限を超えた」と判断した build 1 件について、
//! cancel するか見逃すかを決めます。
//!
//! # 判定（先に一致したものが勝つ）
//! 1. repository を解決する（失敗は hard error、reap しない）
//! 2. Pending なら即 cancel（stage は見ない）
//! 3. stage の timeline を集計する
//!    - 実行中の stage がなければ cancel
//!    - 最新の開始時刻が repository の timeout + buffer を超えていれば cancel
//!    - それ以外は何もしない

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::domain::{
    Build, CancelReason, Deadlines, ReapDecision, ReaperError, Repository, StageTimeline, Status,
    is_exceeded,
};
use crate::ports::{BuildStore, Canceler, Clock, RepositoryStore, StageStore};

/// Decision engine plus the collaborators it reads from and cancels through.
///
/// Built by [`crate::app::ReaperBuilder`]; the deadlines never change afterwards.
pub struct Reaper {
    pub(crate) repos: Arc<dyn RepositoryStore>,
    pub(crate) builds: Arc<dyn BuildStore>,
    pub(crate) stages: Arc<dyn StageStore>,
    pub(crate) canceler: Arc<dyn Canceler>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) deadlines: Deadlines,
}

impl Reaper {
    pub fn deadlines(&self) -> &Deadlines {
        &self.deadlines
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn build_store(&self) -> &dyn BuildStore {
        self.builds.as_ref()
    }

    /// Decide what to do with `build` without cancelling anything.
    pub async fn evaluate(
        &self,
        build: &Build,
        now: DateTime<Utc>,
    ) -> Result<(Repository, ReapDecision), ReaperError> {
        let repo = self.repos.find(build.repo_id).await?;

        if build.status == Status::Pending {
            return Ok((repo, ReapDecision::Cancel(CancelReason::PendingTimeout)));
        }

        let stages = self.stages.list_by_build(build.id).await?;
        let decision = match StageTimeline::from_stages(&stages) {
            StageTimeline::NoActiveStage => ReapDecision::Cancel(CancelReason::NoActiveStage),
            StageTimeline::ActiveSince(started) => {
                if is_exceeded(now, started, repo.timeout(), self.deadlines.buffer) {
                    ReapDecision::Cancel(CancelReason::ExecutionTimeout)
                } else {
                    trace!(
                        build = %build.id,
                        active_since = %started,
                        timeout_minutes = repo.timeout_minutes,
                        "stage timeline within repository timeout"
                    );
                    ReapDecision::NoOp
                }
            }
        };
        Ok((repo, decision))
    }

    /// Evaluate `build` and cancel it through the canceler if it is stuck.
    pub async fn reap_maybe(
        &self,
        build: &Build,
        now: DateTime<Utc>,
    ) -> Result<ReapDecision, ReaperError> {
        let (repo, decision) = self.evaluate(build, now).await?;
        debug!(
            build = %build.id,
            repo = %repo.slug,
            status = %build.status,
            decision = ?decision,
            "reap decision"
        );

        if let ReapDecision::Cancel(reason) = decision {
            self.canceler
                .cancel(&repo, build)
                .await
                .map_err(|source| ReaperError::Cancel {
                    build: build.id,
                    source,
                })?;
            warn!(
                build = %build.id,
                repo = %repo.slug,
                number = build.number,
                reason = %reason,
                "cancelled stuck build"
            );
        }
        Ok(decision)
    }
}
