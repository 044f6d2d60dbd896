//! Tracking of fire-and-forget work spawned from request handlers.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Set of detached tasks that shutdown waits on.
///
/// Handlers spawn work here (such as sending email) so that responses are not
/// delayed by it. A panicking task is logged and does not affect others.
#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.tasks.lock() {
            Ok(mut tasks) => {
                // Reap finished tasks so the set does not grow without bound.
                while let Some(result) = tasks.try_join_next() {
                    log_outcome(result);
                }
                tasks.spawn(task);
            }
            Err(_) => {
                error!("background task set poisoned, running task untracked");
                tokio::spawn(task);
            }
        }
    }

    /// Number of tasks not yet reaped.
    pub fn len(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for every task spawned so far, giving up after `limit`.
    ///
    /// Returns false if the limit was hit; remaining tasks are aborted.
    pub async fn wait(&self, limit: Duration) -> bool {
        let mut tasks = match self.tasks.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return true,
        };

        if tasks.is_empty() {
            return true;
        }

        debug!(pending = tasks.len(), "waiting for background tasks");

        let drained = tokio::time::timeout(limit, async {
            while let Some(result) = tasks.join_next().await {
                log_outcome(result);
            }
        })
        .await;

        match drained {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    pending = tasks.len(),
                    "background tasks did not finish in time, aborting"
                );
                tasks.abort_all();
                false
            }
        }
    }
}

fn log_outcome(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!(error = %e, "background task panicked");
        }
    }
}
