//! StageTimeline - 未完了 stage の最新の開始時刻
//!
//! 未完了 stage がない（または開始時刻がない）場合は `NoActiveStage`。

use chrono::{DateTime, Utc};

use super::build::Stage;

/// Execution timeline of a build, derived from its stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTimeline {
    /// Every stage is finished, or no unfinished stage has started.
    NoActiveStage,

    /// Latest start among the unfinished stages.
    ActiveSince(DateTime<Utc>),
}

impl StageTimeline {
    pub fn from_stages<'a>(stages: impl IntoIterator<Item = &'a Stage>) -> Self {
        stages
            .into_iter()
            .filter(|stage| !stage.is_done())
            .filter_map(|stage| stage.started)
            .max()
            .map_or(Self::NoActiveStage, Self::ActiveSince)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildId, StageId, Status};
    use chrono::{TimeDelta, TimeZone};
    use ulid::Ulid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn stage(build_id: BuildId, number: u32, status: Status, started: Option<DateTime<Utc>>) -> Stage {
        let mut stage = Stage::pending(StageId::from_ulid(Ulid::new()), build_id, number, "stage");
        stage.status = status;
        stage.started = started;
        stage
    }

    #[test]
    fn no_stages_has_no_timeline() {
        assert_eq!(StageTimeline::from_stages(&Vec::<Stage>::new()), StageTimeline::NoActiveStage);
    }

    #[test]
    fn finished_stages_are_ignored() {
        let build_id = BuildId::from_ulid(Ulid::new());
        let stages = vec![
            stage(build_id, 1, Status::Passing, Some(t0())),
            stage(build_id, 2, Status::Killed, Some(t0() + TimeDelta::minutes(5))),
            stage(build_id, 3, Status::Skipped, None),
        ];
        assert_eq!(StageTimeline::from_stages(&stages), StageTimeline::NoActiveStage);
    }

    #[test]
    fn unstarted_pending_stages_have_no_timeline() {
        let build_id = BuildId::from_ulid(Ulid::new());
        let stages = vec![
            stage(build_id, 1, Status::Pending, None),
            stage(build_id, 2, Status::WaitingOnDependencies, None),
        ];
        assert_eq!(StageTimeline::from_stages(&stages), StageTimeline::NoActiveStage);
    }

    #[test]
    fn latest_unfinished_start_wins() {
        let build_id = BuildId::from_ulid(Ulid::new());
        let latest = t0() + TimeDelta::minutes(20);
        let stages = vec![
            stage(build_id, 1, Status::Running, Some(t0())),
            stage(build_id, 2, Status::Running, Some(latest)),
            // finished later than every active stage, must not count
            stage(build_id, 3, Status::Passing, Some(t0() + TimeDelta::minutes(40))),
            stage(build_id, 4, Status::Pending, None),
        ];
        assert_eq!(StageTimeline::from_stages(&stages), StageTimeline::ActiveSince(latest));
    }
}
