//! Fetch orchestrator split into focused submodules.
//!
//! The [`FetchOrchestrator`] struct and its methods are organized by concern:
//! - [`request`] - Issuing page requests (callback, channel and awaitable forms)
//! - [`fetch_task`] - The spawned task that drives one fetch to a terminal state
//! - [`lifecycle`] - Cancellation and shutdown

mod fetch_task;
mod lifecycle;
mod request;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::idle::IdleSignal;
use crate::repository::{PageRepository, TimeoutRepository};
use crate::subscription::SubscriptionGroup;
use crate::types::{FetchEvent, HandleId};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::task::TaskTracker;

/// Orchestrates cancellable page fetches against a repository
///
/// Every call to [`request_page`](Self::request_page) registers a handle in
/// the orchestrator's [`SubscriptionGroup`] and spawns a task that asks the
/// repository for the page. When the fetch settles the handle is removed and
/// the outcome is delivered exactly once. [`cancel_all`](Self::cancel_all)
/// silences every fetch that has not settled yet.
///
/// Cloning is cheap; clones share the same group, event channel and runtime.
pub struct FetchOrchestrator<T> {
    /// Source of pages (already wrapped with a timeout if configured)
    pub(crate) repository: Arc<dyn PageRepository<T>>,
    /// Busy/idle observer notified per fetch
    pub(crate) idle_signal: Arc<dyn IdleSignal>,
    /// Handles of all fetches that are issued but not yet settled or cancelled
    pub(crate) subscriptions: SubscriptionGroup,
    /// Lifecycle event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<FetchEvent>,
    /// Configuration
    pub(crate) config: Arc<Config>,
    /// Runtime the fetch tasks are spawned on
    pub(crate) runtime: tokio::runtime::Handle,
    /// Tracks spawned fetch tasks so shutdown can wait for them
    pub(crate) tasks: TaskTracker,
    /// Next handle id
    pub(crate) next_handle_id: Arc<AtomicU64>,
    /// Whether new requests are accepted (set to false during shutdown)
    ///
    /// Requests hold the read lock from the check until their task is
    /// tracked, so shutdown's write lock waits for in-progress registrations.
    pub(crate) accepting_new: Arc<RwLock<bool>>,
}

impl<T> Clone for FetchOrchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            idle_signal: Arc::clone(&self.idle_signal),
            subscriptions: self.subscriptions.clone(),
            event_tx: self.event_tx.clone(),
            config: Arc::clone(&self.config),
            runtime: self.runtime.clone(),
            tasks: self.tasks.clone(),
            next_handle_id: Arc::clone(&self.next_handle_id),
            accepting_new: Arc::clone(&self.accepting_new),
        }
    }
}

impl<T> FetchOrchestrator<T>
where
    T: Send + 'static,
{
    /// Create an orchestrator that spawns fetches on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a tokio runtime and
    /// [`Error::Config`] when `config` does not validate.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use moviehub_fetch::{Config, FetchOrchestrator, InMemoryRepository, Movie, NoOpIdleSignal};
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let orchestrator = FetchOrchestrator::<Movie>::new(
    ///     Arc::new(InMemoryRepository::<Movie>::new()),
    ///     Arc::new(NoOpIdleSignal),
    ///     Config::default(),
    /// )?;
    /// assert_eq!(orchestrator.in_flight(), 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        repository: Arc<dyn PageRepository<T>>,
        idle_signal: Arc<dyn IdleSignal>,
        config: Config,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::Runtime(format!(
                "FetchOrchestrator::new must be called inside a tokio runtime: {e}"
            ))
        })?;
        Self::with_runtime(repository, idle_signal, config, runtime)
    }

    /// Create an orchestrator that spawns fetches on `runtime`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `config` does not validate.
    pub fn with_runtime(
        repository: Arc<dyn PageRepository<T>>,
        idle_signal: Arc<dyn IdleSignal>,
        config: Config,
        runtime: tokio::runtime::Handle,
    ) -> Result<Self> {
        config.validate()?;

        let repository = match config.fetch.fetch_timeout {
            Some(timeout) => {
                Arc::new(TimeoutRepository::new(repository, timeout)) as Arc<dyn PageRepository<T>>
            }
            None => repository,
        };

        let (event_tx, _rx) = broadcast::channel(config.fetch.event_channel_capacity);

        tracing::debug!(
            repository = repository.name(),
            idle_signal = idle_signal.name(),
            fetch_timeout_ms = config.fetch.fetch_timeout.map(|t| t.as_millis() as u64),
            "Fetch orchestrator created"
        );

        Ok(Self {
            repository,
            idle_signal,
            subscriptions: SubscriptionGroup::new(),
            event_tx,
            config: Arc::new(config),
            runtime,
            tasks: TaskTracker::new(),
            next_handle_id: Arc::new(AtomicU64::new(1)),
            accepting_new: Arc::new(RwLock::new(true)),
        })
    }
}

impl<T> FetchOrchestrator<T> {
    /// Subscribe to lifecycle events
    ///
    /// Each subscriber receives every event emitted after it subscribed.
    /// Subscribers that fall more than `event_channel_capacity` events behind
    /// receive a `Lagged` error and skip the oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<FetchEvent> {
        self.event_tx.subscribe()
    }

    /// Lifecycle events as a [`Stream`](futures::Stream)
    pub fn event_stream(&self) -> BroadcastStream<FetchEvent> {
        BroadcastStream::new(self.subscribe())
    }

    /// Number of fetches issued but not yet settled or cancelled
    pub fn in_flight(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the fetch with `id` is still in flight
    pub fn is_in_flight(&self, id: HandleId) -> bool {
        self.subscriptions.contains(id)
    }

    /// Whether new requests are accepted (false once shutdown started)
    pub fn is_accepting(&self) -> bool {
        *self.accepting_new.read()
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the repository in use, for diagnostics
    pub fn repository_name(&self) -> &'static str {
        self.repository.name()
    }

    pub(crate) fn next_handle_id(&self) -> HandleId {
        HandleId(self.next_handle_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn emit(&self, event: FetchEvent) {
        // No subscribers is not an error
        self.event_tx.send(event).ok();
    }
}
