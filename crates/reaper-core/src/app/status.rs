//! Status - sweep pass の集計

use serde::Serialize;

use crate::domain::ReapDecision;

/// Counts for one completed sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pending builds listed by the store.
    pub pending_candidates: usize,

    /// Running builds listed by the store.
    pub running_candidates: usize,

    /// Candidates past their sweep deadline (handed to the decision engine).
    pub over_deadline: usize,

    pub cancelled: usize,

    /// Over-deadline builds whose stage timeline was still fresh.
    pub left_alone: usize,
}

impl SweepReport {
    pub(crate) fn record(&mut self, decision: ReapDecision) {
        self.over_deadline += 1;
        match decision {
            ReapDecision::Cancel(_) => self.cancelled += 1,
            ReapDecision::NoOp => self.left_alone += 1,
        }
    }
}
