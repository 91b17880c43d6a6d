//! End-to-end sweep scenarios against the in-memory collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tokio::sync::Mutex;

use reaper_core::app::{PassOutcome, ReaperBuilder, ReaperLoop};
use reaper_core::domain::{
    Build, BuildId, CancelError, ReaperError, Repository, Stage, Status,
};
use reaper_core::impls::{InMemoryCanceler, InMemoryStore};
use reaper_core::ports::{Canceler, FixedClock, IdGenerator, UlidGenerator};

const MINUTE: Duration = Duration::from_secs(60);

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn ago(minutes: i64) -> DateTime<Utc> {
    t0() - TimeDelta::minutes(minutes)
}

/// Canceler that fails on one chosen call and records every attempt.
struct FlakyCanceler {
    inner: InMemoryCanceler,
    fail_on_call: usize,
    calls: AtomicUsize,
    attempts: Mutex<Vec<BuildId>>,
}

#[async_trait]
impl Canceler for FlakyCanceler {
    async fn cancel(&self, repo: &Repository, build: &Build) -> Result<(), CancelError> {
        self.attempts.lock().await.push(build.id);
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(CancelError::Rejected("worker unreachable".into()));
        }
        self.inner.cancel(repo, build).await
    }
}

struct Scenario {
    store: InMemoryStore,
    ids: UlidGenerator<FixedClock>,
    repo: Repository,
}

impl Scenario {
    async fn new(repo_timeout_minutes: u32) -> Self {
        let store = InMemoryStore::new();
        let ids = UlidGenerator::new(FixedClock::new(t0()));
        let repo = Repository::new(ids.generate_repo_id(), "octocat/hello-world", repo_timeout_minutes);
        store.insert_repo(repo.clone()).await;
        Self { store, ids, repo }
    }

    async fn pending(&self, number: u64, created_minutes_ago: i64) -> Build {
        let build = Build::pending(self.ids.generate_build_id(), self.repo.id, number, ago(created_minutes_ago));
        self.store.insert_build(build.clone()).await;
        build
    }

    async fn running_with_stage(&self, number: u64, stage_started_minutes_ago: i64) -> Build {
        let mut build = Build::pending(self.ids.generate_build_id(), self.repo.id, number, ago(3000));
        build.start(ago(2990));
        self.store.insert_build(build.clone()).await;
        let mut stage = Stage::pending(self.ids.generate_stage_id(), build.id, 1, "pipeline");
        stage.start(ago(stage_started_minutes_ago));
        self.store.insert_stage(stage).await;
        build
    }

    fn reaper_loop(&self, canceler: Arc<dyn Canceler>, pending: Duration, buffer: Duration) -> ReaperLoop {
        let reaper = ReaperBuilder::new()
            .store(Arc::new(self.store.clone()))
            .canceler(canceler)
            .clock(Arc::new(FixedClock::new(t0())))
            .pending_deadline(pending)
            .buffer(buffer)
            .build()
            .unwrap();
        ReaperLoop::new(Arc::new(reaper))
    }
}

#[tokio::test]
async fn pending_hour_deadline_with_five_minute_buffer() {
    let scenario = Scenario::new(60).await;
    let stuck = scenario.pending(1, 70).await;
    let queued = scenario.pending(2, 64).await;
    let canceler = Arc::new(InMemoryCanceler::new(scenario.store.clone()));
    let reaper_loop = scenario.reaper_loop(canceler.clone(), 60 * MINUTE, 5 * MINUTE);

    let report = reaper_loop.sweep().await.unwrap();

    assert_eq!(report.cancelled, 1);
    assert_eq!(canceler.cancelled().await, vec![stuck.id]);
    assert_eq!(scenario.store.build(queued.id).await.unwrap().status, Status::Pending);
}

#[tokio::test]
async fn repository_timeout_with_five_minute_buffer() {
    let scenario = Scenario::new(30).await;
    let healthy = scenario.running_with_stage(1, 34).await;
    let stuck = scenario.running_with_stage(2, 36).await;
    let canceler = Arc::new(InMemoryCanceler::new(scenario.store.clone()));
    // default 24h running deadline: both builds started ~50h ago
    let reaper_loop = scenario.reaper_loop(canceler.clone(), 60 * MINUTE, 5 * MINUTE);

    let report = reaper_loop.sweep().await.unwrap();

    assert_eq!(report.over_deadline, 2);
    assert_eq!(report.left_alone, 1);
    assert_eq!(canceler.cancelled().await, vec![stuck.id]);
    assert_eq!(scenario.store.build(healthy.id).await.unwrap().status, Status::Running);
    let killed = scenario.store.build(stuck.id).await.unwrap();
    assert_eq!(killed.status, Status::Killed);
    assert!(killed.finished.is_some());
}

#[tokio::test]
async fn cancel_failure_stops_pass_and_next_pass_resumes() {
    let scenario = Scenario::new(60).await;
    let mut builds = Vec::new();
    for number in 1..=5 {
        builds.push(scenario.pending(number, 120).await);
    }
    let canceler = Arc::new(FlakyCanceler {
        inner: InMemoryCanceler::with_clock(scenario.store.clone(), Arc::new(FixedClock::new(t0()))),
        fail_on_call: 3,
        calls: AtomicUsize::new(0),
        attempts: Mutex::new(Vec::new()),
    });
    let reaper_loop = scenario.reaper_loop(canceler.clone(), 60 * MINUTE, 5 * MINUTE);

    let first = reaper_loop.run_pass().await;

    assert!(matches!(
        first,
        PassOutcome::Aborted(ReaperError::Cancel { build, .. }) if build == builds[2].id
    ));
    let attempted: Vec<BuildId> = canceler.attempts.lock().await.clone();
    assert_eq!(attempted, vec![builds[0].id, builds[1].id, builds[2].id]);
    for untouched in &builds[2..] {
        assert_eq!(scenario.store.build(untouched.id).await.unwrap().status, Status::Pending);
    }

    let report = match reaper_loop.run_pass().await {
        PassOutcome::Completed(report) => report,
        other => panic!("second pass should complete, got {other:?}"),
    };
    // the two builds killed in the first pass are no longer candidates
    assert_eq!(report.pending_candidates, 3);
    assert_eq!(report.cancelled, 3);
    let attempted: Vec<BuildId> = canceler.attempts.lock().await[3..].to_vec();
    assert_eq!(attempted, vec![builds[2].id, builds[3].id, builds[4].id]);
    assert!(scenario.store.builds().await.iter().all(|b| b.status == Status::Killed));
}

#[tokio::test]
async fn build_finishing_between_listing_and_cancel_is_left_as_is() {
    let scenario = Scenario::new(60).await;
    let build = scenario.pending(1, 120).await;
    let canceler = Arc::new(InMemoryCanceler::new(scenario.store.clone()));
    let reaper_loop = scenario.reaper_loop(canceler.clone(), 60 * MINUTE, 5 * MINUTE);

    // the build was listed as pending, then finished before the canceler ran
    let mut finished = build.clone();
    finished.start(ago(1));
    finished.status = Status::Passing;
    scenario.store.insert_build(finished).await;

    reaper_loop.reaper().reap_maybe(&build, t0()).await.unwrap();

    assert_eq!(scenario.store.build(build.id).await.unwrap().status, Status::Passing);
    assert!(canceler.cancelled().await.is_empty());
}
