//! Ports - 抽象化レイヤー
//!
//! reaper が依存する外部サービス（store と canceler）のインターフェースです。
//! 実装は reaper の外側にあり、開発・テスト用の in-memory 実装だけを
//! `impls` に置いています。
//!
//! # 設計原則
//! - store が source of truth（reaper は自分の状態を永続化しない）
//! - reaper が行う書き込みは `Canceler::cancel` だけ

pub mod build_store;
pub mod canceler;
pub mod clock;
pub mod id_generator;
pub mod repository_store;
pub mod stage_store;

// 主要な trait を再エクスポート
pub use self::build_store::BuildStore;
pub use self::canceler::Canceler;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::repository_store::RepositoryStore;
pub use self::stage_store::StageStore;
