//! Fire-and-forget side effects.
//!
//! Tasks run detached on the tokio runtime: at most once, never retried,
//! failures logged. Handles are kept only so shutdown (and tests) can wait for
//! in-flight work to settle.

use crate::error::ApiError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone, Default)]
pub struct TaskSpawner {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TaskSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            match task.await {
                Ok(()) => debug!(task = label, "background task finished"),
                Err(err) => warn!(task = label, error = %err, "background task failed"),
            }
        });
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    pub fn in_flight(&self) -> usize {
        self.handles.lock().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every task spawned so far.
    pub async fn drain(&self) {
        loop {
            let pending = std::mem::take(&mut *self.handles.lock());
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(err) = handle.await {
                    warn!(error = %err, "background task panicked or was cancelled");
                }
            }
        }
    }
}
