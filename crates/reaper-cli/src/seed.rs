//! JSON fixture loading for the in-memory store.
//!
//! Timestamps are given relative to start-up so a fixture stays meaningful
//! whenever it is loaded:
//!
//! ```json
//! {
//!   "repositories": [{
//!     "slug": "octocat/hello-world",
//!     "timeout_minutes": 30,
//!     "builds": [
//!       { "number": 1, "status": "pending", "created_minutes_ago": 1500 },
//!       { "number": 2, "status": "running", "created_minutes_ago": 1600,
//!         "started_minutes_ago": 1590,
//!         "stages": [{ "name": "test", "status": "running", "started_minutes_ago": 50 }] }
//!     ]
//!   }]
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use thiserror::Error;

use reaper_core::domain::{Build, Repository, Stage, Status};
use reaper_core::impls::InMemoryStore;
use reaper_core::ports::IdGenerator;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{repo} build #{number} is pending but has a start time")]
    StartedWhilePending { repo: String, number: u64 },

    #[error("{repo} build #{number} has a timestamp out of range")]
    TimestampOutOfRange { repo: String, number: u64 },
}

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub repositories: Vec<RepoFixture>,
}

#[derive(Debug, Deserialize)]
pub struct RepoFixture {
    pub slug: String,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u32,
    #[serde(default)]
    pub builds: Vec<BuildFixture>,
}

fn default_timeout_minutes() -> u32 {
    reaper_core::domain::repository::DEFAULT_TIMEOUT_MINUTES
}

#[derive(Debug, Deserialize)]
pub struct BuildFixture {
    pub number: u64,
    pub status: Status,
    pub created_minutes_ago: i64,
    #[serde(default)]
    pub started_minutes_ago: Option<i64>,
    #[serde(default)]
    pub stages: Vec<StageFixture>,
}

#[derive(Debug, Deserialize)]
pub struct StageFixture {
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub started_minutes_ago: Option<i64>,
}

/// Totals of what was seeded.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Seeded {
    pub repositories: usize,
    pub builds: usize,
    pub stages: usize,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Insert every record into `store`, assigning fresh ids.
    pub async fn seed(
        &self,
        store: &InMemoryStore,
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> Result<Seeded, SeedError> {
        let ago = |minutes: i64| TimeDelta::try_minutes(minutes).and_then(|delta| now.checked_sub_signed(delta));
        let mut seeded = Seeded::default();

        for repo_fixture in &self.repositories {
            let repo = Repository::new(
                ids.generate_repo_id(),
                repo_fixture.slug.clone(),
                repo_fixture.timeout_minutes,
            );
            store.insert_repo(repo.clone()).await;
            seeded.repositories += 1;

            for build_fixture in &repo_fixture.builds {
                if build_fixture.status == Status::Pending && build_fixture.started_minutes_ago.is_some() {
                    return Err(SeedError::StartedWhilePending {
                        repo: repo.slug.clone(),
                        number: build_fixture.number,
                    });
                }
                let out_of_range = || SeedError::TimestampOutOfRange {
                    repo: repo.slug.clone(),
                    number: build_fixture.number,
                };
                let relative = |minutes: Option<i64>| minutes.map(|m| ago(m).ok_or_else(out_of_range)).transpose();

                let created = ago(build_fixture.created_minutes_ago).ok_or_else(out_of_range)?;
                let mut build = Build::pending(ids.generate_build_id(), repo.id, build_fixture.number, created);
                build.status = build_fixture.status;
                build.started = relative(build_fixture.started_minutes_ago)?;
                store.insert_build(build.clone()).await;
                seeded.builds += 1;

                for (index, stage_fixture) in build_fixture.stages.iter().enumerate() {
                    let mut stage = Stage::pending(
                        ids.generate_stage_id(),
                        build.id,
                        u32::try_from(index + 1).unwrap_or(u32::MAX),
                        stage_fixture.name.clone(),
                    );
                    stage.status = stage_fixture.status;
                    stage.started = relative(stage_fixture.started_minutes_ago)?;
                    store.insert_stage(stage).await;
                    seeded.stages += 1;
                }
            }
        }
        Ok(seeded)
    }
}
