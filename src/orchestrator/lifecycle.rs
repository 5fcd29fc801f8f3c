//! Cancellation and shutdown.

use super::FetchOrchestrator;
use crate::error::Result;
use crate::types::{FetchEvent, HandleId};

impl<T> FetchOrchestrator<T> {
    /// Cancel every in-flight fetch and empty the group
    ///
    /// None of the cancelled fetches will invoke its callback. Fetches that
    /// already settled are no longer in the group and are unaffected. Safe
    /// to call repeatedly; calling it with nothing in flight is a no-op.
    ///
    /// Returns the number of fetches that were cancelled.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.subscriptions.cancel_all();
        if cancelled > 0 {
            tracing::info!(cancelled, "Cancelled all in-flight page fetches");
        } else {
            tracing::debug!("cancel_all called with nothing in flight");
        }
        cancelled
    }

    /// Cancel a single in-flight fetch
    ///
    /// Returns `false` if the fetch already settled or was cancelled.
    pub fn cancel(&self, id: HandleId) -> bool {
        let cancelled = self.subscriptions.cancel(id);
        tracing::debug!(handle_id = id.0, cancelled, "Cancel requested for page fetch");
        cancelled
    }

    /// Shut the orchestrator down
    ///
    /// 1. Stops accepting new requests ([`Error::ShuttingDown`](crate::Error::ShuttingDown))
    /// 2. Cancels every in-flight fetch
    /// 3. Waits for the spawned fetch tasks to wind down, bounded by
    ///    `shutdown_timeout`
    /// 4. Emits [`FetchEvent::Shutdown`]
    ///
    /// A timeout while waiting is logged and does not fail the shutdown.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating fetch orchestrator shutdown");

        // Waits for requests that already passed the check to finish registering
        *self.accepting_new.write() = false;
        let cancelled = self.cancel_all();

        self.tasks.close();
        let shutdown_timeout = self.config.fetch.shutdown_timeout;
        match tokio::time::timeout(shutdown_timeout, self.tasks.wait()).await {
            Ok(()) => {
                tracing::info!(cancelled, "All fetch tasks finished");
            }
            Err(_) => {
                tracing::warn!(
                    remaining = self.tasks.len(),
                    timeout_ms = shutdown_timeout.as_millis() as u64,
                    "Timeout waiting for fetch tasks to finish, proceeding with shutdown"
                );
            }
        }

        self.emit(FetchEvent::Shutdown);
        tracing::info!("Fetch orchestrator shutdown complete");
        Ok(())
    }
}
