//! App - アプリケーション層
//!
//! ports を組み合わせて reaper のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ReaperBuilder**: collaborator と deadline のワイヤリング
//! - **Reaper**: 1 build ごとの判定（cancel / 何もしない）と cancel
//! - **ReaperLoop**: 定期 sweep（pending → running）と panic からの回復
//! - **SweepReport**: pass ごとの集計

pub mod builder;
pub mod reaper;
pub mod reaper_loop;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ReaperBuilder};
pub use self::reaper::Reaper;
pub use self::reaper_loop::{PassOutcome, ReaperHandle, ReaperLoop, StopReason};
pub use self::status::SweepReport;
