//! Errors - エラー型と分類
//!
//! - StoreError: store（repository / build / stage）の読み出し失敗
//! - CancelError: Canceler の失敗
//! - ReaperError: sweep pass を中断させるエラー（次の tick で自然に再試行）

use thiserror::Error;

use super::ids::BuildId;

/// ErrorKind は pass を中断したエラーの分類（ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Store,
    Cancel,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CancelError {
    #[error("cancel rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ReaperError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot cancel {build}: {source}")]
    Cancel {
        build: BuildId,
        #[source]
        source: CancelError,
    },
}

impl ReaperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReaperError::Store(_) => ErrorKind::Store,
            ReaperError::Cancel { .. } => ErrorKind::Cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn not_found_message_names_entity() {
        let err = StoreError::not_found("repository", "repo-1");
        assert_eq!(err.to_string(), "repository not found: repo-1");
    }

    #[test]
    fn cancel_error_is_classified() {
        let build = BuildId::from_ulid(Ulid::new());
        let err = ReaperError::Cancel {
            build,
            source: CancelError::Rejected("locked".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Cancel);
        assert!(err.to_string().contains(&build.to_string()));
        assert!(err.to_string().contains("locked"));
    }
}
