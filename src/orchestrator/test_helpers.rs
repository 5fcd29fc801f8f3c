//! Shared test helpers for creating FetchOrchestrator instances in tests.

use crate::config::Config;
use crate::error::{RepositoryError, Result};
use crate::idle::{CountingIdleSignal, IdleSignal};
use crate::orchestrator::FetchOrchestrator;
use crate::repository::{InMemoryRepository, PageRepository};
use crate::types::{Movie, Page};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Upper bound for anything a test waits on
pub(crate) const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A delay long enough that a fetch is guaranteed to still be in flight
pub(crate) const NEVER: Duration = Duration::from_secs(3600);

/// Build a page of movies titled after `titles`, ids starting at 1
pub(crate) fn movies_page(page_number: u32, titles: &[&str], has_more: bool) -> Page<Movie> {
    let items = titles
        .iter()
        .enumerate()
        .map(|(i, title)| Movie::new(i as u64 + 1, *title))
        .collect();
    Page::new(page_number, items, has_more)
}

/// Idle signal that records every call and can be awaited
#[derive(Debug, Default)]
pub(crate) struct RecordingIdleSignal {
    busy_calls: AtomicUsize,
    idle_calls: AtomicUsize,
    counter: CountingIdleSignal,
}

impl RecordingIdleSignal {
    pub(crate) fn busy_calls(&self) -> usize {
        self.busy_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn idle_calls(&self) -> usize {
        self.idle_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn is_idle_now(&self) -> bool {
        self.counter.is_idle_now()
    }

    /// Wait until all outstanding work finished, failing the test on timeout
    pub(crate) async fn wait_for_idle(&self) {
        tokio::time::timeout(TEST_TIMEOUT, self.counter.wait_for_idle())
            .await
            .expect("orchestrator did not go idle in time");
    }
}

impl IdleSignal for RecordingIdleSignal {
    fn mark_busy(&self) {
        self.busy_calls.fetch_add(1, Ordering::SeqCst);
        self.counter.mark_busy();
    }

    fn mark_idle(&self) {
        self.idle_calls.fetch_add(1, Ordering::SeqCst);
        self.counter.mark_idle();
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Collects callback invocations
#[derive(Clone, Default)]
pub(crate) struct CallbackLog {
    results: Arc<Mutex<Vec<Result<Page<Movie>>>>>,
}

impl CallbackLog {
    /// A callback that appends its outcome to this log
    pub(crate) fn callback(&self) -> impl FnOnce(Result<Page<Movie>>) + Send + 'static {
        let results = Arc::clone(&self.results);
        move |result| results.lock().push(result)
    }

    pub(crate) fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }

    /// Take all recorded outcomes
    pub(crate) fn take(&self) -> Vec<Result<Page<Movie>>> {
        std::mem::take(&mut *self.results.lock())
    }
}

/// Repository that panics on every fetch
pub(crate) struct PanickingRepository;

#[async_trait]
impl PageRepository<Movie> for PanickingRepository {
    async fn fetch_page(&self, page_number: u32) -> std::result::Result<Page<Movie>, RepositoryError> {
        panic!("repository exploded on page {page_number}");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Orchestrator over `repository` with a recording idle signal and default config
pub(crate) fn create_test_orchestrator(
    repository: Arc<dyn PageRepository<Movie>>,
) -> (FetchOrchestrator<Movie>, Arc<RecordingIdleSignal>) {
    create_test_orchestrator_with_config(repository, Config::default())
}

/// Orchestrator over `repository` with a recording idle signal
pub(crate) fn create_test_orchestrator_with_config(
    repository: Arc<dyn PageRepository<Movie>>,
    config: Config,
) -> (FetchOrchestrator<Movie>, Arc<RecordingIdleSignal>) {
    let idle = Arc::new(RecordingIdleSignal::default());
    let orchestrator = FetchOrchestrator::new(repository, idle.clone(), config).unwrap();
    (orchestrator, idle)
}

/// Repository serving page 1 (`A`, `B`) and page 2 (`C`) with a short delay
pub(crate) fn two_page_repository() -> Arc<InMemoryRepository<Movie>> {
    Arc::new(
        InMemoryRepository::new()
            .with_page(movies_page(1, &["A", "B"], true))
            .with_page(movies_page(2, &["C"], false))
            .with_default_delay(Duration::from_millis(10)),
    )
}

/// Wait until `condition` holds, failing the test on timeout
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(TEST_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
