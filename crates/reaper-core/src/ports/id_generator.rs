//! IdGenerator port - ID 生成の抽象化
//!
//! reaper 自身は ID を発行しません。store に記録を投入する側
//! （InMemoryStore の seed、CLI の fixture 読み込み、テスト）が使います。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock から timestamp 部分を取る）

use crate::domain::ids::{BuildId, RepoId, StageId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は分散システムで使える ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_repo_id(&self) -> RepoId;

    fn generate_build_id(&self) -> BuildId;

    fn generate_stage_id(&self) -> StageId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を使うと timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_repo_id(&self) -> RepoId {
        RepoId::from(self.next_ulid())
    }

    fn generate_build_id(&self) -> BuildId {
        BuildId::from(self.next_ulid())
    }

    fn generate_stage_id(&self) -> StageId {
        StageId::from(self.next_ulid())
    }
}
