//! InMemoryCanceler - InMemoryStore に対する Canceler

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::InMemoryStore;
use crate::domain::{Build, BuildId, CancelError, Repository};
use crate::ports::{Canceler, Clock, SystemClock};

/// Kills builds in an [`InMemoryStore`] and remembers which ones it killed.
pub struct InMemoryCanceler {
    store: InMemoryStore,
    clock: Arc<dyn Clock>,
    cancelled: Mutex<Vec<BuildId>>,
}

impl InMemoryCanceler {
    pub fn new(store: InMemoryStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: InMemoryStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            cancelled: Mutex::new(Vec::new()),
        }
    }

    /// Builds this canceler transitioned to killed, in call order.
    pub async fn cancelled(&self) -> Vec<BuildId> {
        self.cancelled.lock().await.clone()
    }
}

#[async_trait]
impl Canceler for InMemoryCanceler {
    async fn cancel(&self, repo: &Repository, build: &Build) -> Result<(), CancelError> {
        let killed = self.store.kill_build(build.id, self.clock.now()).await?;
        if killed {
            self.cancelled.lock().await.push(build.id);
        } else {
            debug!(build = %build.id, repo = %repo.slug, "build already finished, nothing to cancel");
        }
        Ok(())
    }
}
