//! reaper-core
//!
//! Finds builds stuck in pending or running far longer than permitted and
//! cancels them.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, build/stage, repository, deadline, timeline, decision, errors）
//! - **ports**: 抽象化レイヤー（RepositoryStore, BuildStore, StageStore, Canceler, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（ReaperBuilder, Reaper, ReaperLoop, SweepReport）
//! - **impls**: 実装（InMemoryStore, InMemoryCanceler など開発用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
