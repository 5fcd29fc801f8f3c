//! Repository and callback fixtures

use moviehub_fetch::{
    Config, CountingIdleSignal, FetchOrchestrator, InMemoryRepository, Movie, Page,
    RepositoryError, Result,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::TEST_TIMEOUT;

/// Delay long enough that a fetch is still in flight for the whole test
pub const NEVER: Duration = Duration::from_secs(3600);

/// Page of movies titled after `titles`
pub fn movies_page(page_number: u32, titles: &[&str], has_more: bool) -> Page<Movie> {
    let items = titles
        .iter()
        .enumerate()
        .map(|(i, title)| Movie::new(100 + i as u64, *title))
        .collect();
    Page::new(page_number, items, has_more)
}

/// Page 1 (`A`, `B`, more pages) after a short delay
pub fn scenario_a_repository() -> Arc<InMemoryRepository<Movie>> {
    Arc::new(
        InMemoryRepository::new()
            .with_page(movies_page(1, &["A", "B"], true))
            .with_delay(1, Duration::from_millis(20)),
    )
}

/// Page 2 fails with a network error
pub fn scenario_b_repository() -> Arc<InMemoryRepository<Movie>> {
    Arc::new(
        InMemoryRepository::new()
            .with_failure(2, RepositoryError::Network("network unreachable".into())),
    )
}

/// Pages 1 and 2 exist but never resolve
pub fn stalled_repository() -> Arc<InMemoryRepository<Movie>> {
    Arc::new(
        InMemoryRepository::new()
            .with_page(movies_page(1, &["A", "B"], true))
            .with_page(movies_page(2, &["C"], false))
            .with_default_delay(NEVER),
    )
}

/// Orchestrator plus the counting idle signal it reports to
pub fn orchestrator_over(
    repository: Arc<InMemoryRepository<Movie>>,
) -> (FetchOrchestrator<Movie>, Arc<CountingIdleSignal>) {
    let idle = Arc::new(CountingIdleSignal::new());
    let orchestrator = FetchOrchestrator::<Movie>::new(repository, idle.clone(), Config::default())
        .expect("failed to create orchestrator");
    (orchestrator, idle)
}

/// Wait until the idle signal reports no outstanding fetches
pub async fn wait_for_idle(idle: &CountingIdleSignal) {
    tokio::time::timeout(TEST_TIMEOUT, idle.wait_for_idle())
        .await
        .expect("orchestrator did not go idle in time");
}

/// Collects callback outcomes in invocation order
#[derive(Clone, Default)]
pub struct Recorder {
    outcomes: Arc<Mutex<Vec<Result<Page<Movie>>>>>,
}

impl Recorder {
    pub fn callback(&self) -> impl FnOnce(Result<Page<Movie>>) + Send + 'static {
        let outcomes = Arc::clone(&self.outcomes);
        move |outcome| outcomes.lock().push(outcome)
    }

    pub fn count(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn take(&self) -> Vec<Result<Page<Movie>>> {
        std::mem::take(&mut *self.outcomes.lock())
    }
}
