//! ReaperLoop - 止まった build の定期回収
//!
//! # フロー（1 tick = 1 pass）
//! 1. `now` を一度だけ読む
//! 2. BuildStore::pending() → created が pending deadline を超えたものを Reaper に渡す
//! 3. BuildStore::running() → started が running deadline を超えたものを Reaper に渡す
//! 4. 最初のエラーで pass を打ち切る（残りは次の tick で再評価）
//!
//! pass 中の panic は pass の境界で捕まえてログに残し、loop は止めない。
//! loop を止めるのは shutdown だけ。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace};

use crate::app::reaper::Reaper;
use crate::app::status::SweepReport;
use crate::domain::ReaperError;

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// [`ReaperHandle::request_shutdown`] was called.
    Requested(String),

    /// The handle was dropped without requesting shutdown.
    HandleDropped,
}

/// Result of one supervised pass.
#[derive(Debug)]
pub enum PassOutcome {
    Completed(SweepReport),

    /// A store read or a cancellation failed; the rest of the pass was skipped.
    Aborted(ReaperError),

    /// The pass panicked. Carries the panic message.
    Panicked(String),
}

/// ReaperLoop は一定間隔で sweep pass を実行する
pub struct ReaperLoop {
    reaper: Arc<Reaper>,
}

impl ReaperLoop {
    pub fn new(reaper: Arc<Reaper>) -> Self {
        Self { reaper }
    }

    pub fn reaper(&self) -> &Reaper {
        &self.reaper
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(self, interval: Duration) -> ReaperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(None);
        let join = tokio::spawn(async move { self.run(interval, shutdown_rx).await });
        ReaperHandle { shutdown_tx, join }
    }

    /// Tick every `interval` until shutdown. The first pass runs one interval after start.
    ///
    /// A pass in flight when shutdown arrives runs to completion.
    pub async fn run(
        &self,
        interval: Duration,
        mut shutdown_rx: watch::Receiver<Option<StopReason>>,
    ) -> StopReason {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadlines = self.reaper.deadlines();
        info!(
            interval = ?interval,
            pending_deadline = ?deadlines.pending,
            running_deadline = ?deadlines.running,
            buffer = ?deadlines.buffer,
            "reaper started"
        );

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    let requested = shutdown_rx.borrow_and_update().clone();
                    match (changed, requested) {
                        (_, Some(reason)) => {
                            info!(reason = ?reason, "reaper stopped");
                            return reason;
                        }
                        (Err(_), None) => {
                            info!("reaper handle dropped, stopping");
                            return StopReason::HandleDropped;
                        }
                        (Ok(()), None) => continue,
                    }
                }
                _ = ticker.tick() => {
                    self.run_pass().await;
                }
            }
        }
    }

    /// Run one pass, converting errors and panics into a logged [`PassOutcome`].
    pub async fn run_pass(&self) -> PassOutcome {
        match AssertUnwindSafe(self.sweep()).catch_unwind().await {
            Ok(Ok(report)) => {
                if report.cancelled > 0 {
                    info!(
                        cancelled = report.cancelled,
                        left_alone = report.left_alone,
                        pending = report.pending_candidates,
                        running = report.running_candidates,
                        "reaper pass complete"
                    );
                } else {
                    debug!(
                        left_alone = report.left_alone,
                        pending = report.pending_candidates,
                        running = report.running_candidates,
                        "reaper pass complete"
                    );
                }
                PassOutcome::Completed(report)
            }
            Ok(Err(err)) => {
                error!(error = %err, kind = ?err.kind(), "reaper pass aborted");
                PassOutcome::Aborted(err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "reaper: unexpected panic");
                PassOutcome::Panicked(message)
            }
        }
    }

    /// One sweep pass. Stops at the first error.
    pub async fn sweep(&self) -> Result<SweepReport, ReaperError> {
        let now = self.reaper.now();
        let deadlines = self.reaper.deadlines();
        let store = self.reaper.build_store();
        let mut report = SweepReport::default();

        let pending = store.pending().await?;
        report.pending_candidates = pending.len();
        for build in &pending {
            if !deadlines.pending_exceeded(now, build.created) {
                trace!(build = %build.id, created = %build.created, "pending build within deadline");
                continue;
            }
            let decision = self.reaper.reap_maybe(build, now).await?;
            report.record(decision);
        }

        let running = store.running().await?;
        report.running_candidates = running.len();
        for build in &running {
            // a running build without a start time has never reported progress
            let exceeded = build
                .started
                .is_none_or(|started| deadlines.running_exceeded(now, started));
            if !exceeded {
                trace!(build = %build.id, started = ?build.started, "running build within deadline");
                continue;
            }
            let decision = self.reaper.reap_maybe(build, now).await?;
            report.record(decision);
        }

        Ok(report)
    }
}

/// Handle to a spawned [`ReaperLoop`].
///
/// Dropping the handle stops the loop after the pass in flight, if any.
pub struct ReaperHandle {
    shutdown_tx: watch::Sender<Option<StopReason>>,
    join: JoinHandle<StopReason>,
}

impl ReaperHandle {
    /// Ask the loop to stop. Does not interrupt a pass in flight.
    pub fn request_shutdown(&self, reason: impl Into<String>) {
        // ignore send error: the loop may already have exited
        let _ = self
            .shutdown_tx
            .send(Some(StopReason::Requested(reason.into())));
    }

    /// Request shutdown and wait for the loop to exit.
    pub async fn shutdown_and_join(self, reason: impl Into<String>) -> Result<StopReason, JoinError> {
        self.request_shutdown(reason);
        self.join.await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
