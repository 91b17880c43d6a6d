//! Domain - ドメインモデル
//!
//! ids, status, build/stage, repository, deadline, timeline, decision, errors

pub mod build;
pub mod deadline;
pub mod decision;
pub mod errors;
pub mod ids;
pub mod repository;
pub mod status;
pub mod timeline;

pub use build::{Build, Stage};
pub use deadline::{DEFAULT_BUFFER, DEFAULT_DEADLINE, Deadlines, is_exceeded};
pub use decision::{CancelReason, ReapDecision};
pub use errors::{CancelError, ErrorKind, ReaperError, StoreError};
pub use ids::{BuildId, RepoId, StageId};
pub use repository::Repository;
pub use status::Status;
pub use timeline::StageTimeline;
