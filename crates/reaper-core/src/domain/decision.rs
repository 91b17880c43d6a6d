//! Decision - 期限切れ build 1 件への判定

use std::fmt;

/// The action taken for a build that exceeded its sweep deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapDecision {
    /// Cancel the build and all of its stages.
    Cancel(CancelReason),

    /// Leave the build alone; its stage timeline is still fresh.
    NoOp,
}

impl ReapDecision {
    pub fn is_cancel(self) -> bool {
        matches!(self, ReapDecision::Cancel(_))
    }
}

/// Why a build is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Still queued past the pending deadline.
    PendingTimeout,

    /// Left the queue, but no stage is currently executing.
    NoActiveStage,

    /// The latest active stage exceeded the repository timeout.
    ExecutionTimeout,
}

impl CancelReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CancelReason::PendingTimeout => "pending_timeout",
            CancelReason::NoActiveStage => "no_active_stage",
            CancelReason::ExecutionTimeout => "execution_timeout",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
