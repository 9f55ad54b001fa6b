//! Per-resume write locks.
//!
//! Every writer of a resume's layout (REST handlers and live editor sessions) holds the
//! resume's lock across its load, apply and save, so no write is based on a stale
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct LayoutLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl LayoutLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `resume_id`'s layout.
    pub async fn acquire(&self, resume_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on are dropped.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(resume_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
