//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryStore**: RepositoryStore / BuildStore / StageStore
//! - **InMemoryCanceler**: InMemoryStore 上で build と stage を killed にする
//!
//! 本番用の store と canceler は reaper を組み込む側が提供します。

pub mod inmem_canceler;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::inmem_canceler::InMemoryCanceler;
pub use self::inmem_store::InMemoryStore;
