//! Status - build と stage 共通のライフサイクル

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a build or stage.
///
/// State transitions:
/// - Pending -> Running -> Passing | Failing | Error
/// - Pending | Running -> Killed (cancelled)
/// - WaitingOnDependencies -> Pending (stage whose dependencies finished)
/// - Blocked -> Pending | Declined (approval gate)
/// - Pending -> Skipped
///
/// Design note: Using an enum ensures exhaustive matching and prevents invalid states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Skipped,
    Blocked,
    Declined,
    WaitingOnDependencies,
    Pending,
    Running,
    #[serde(rename = "success")]
    Passing,
    #[serde(rename = "failure")]
    Failing,
    Killed,
    Error,
}

impl Status {
    /// Is this a terminal state (no further transitions)?
    pub fn is_done(self) -> bool {
        !matches!(
            self,
            Status::WaitingOnDependencies | Status::Pending | Status::Running | Status::Blocked
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Skipped => "skipped",
            Status::Blocked => "blocked",
            Status::Declined => "declined",
            Status::WaitingOnDependencies => "waiting_on_dependencies",
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Passing => "success",
            Status::Failing => "failure",
            Status::Killed => "killed",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
