//! In-memory repository with scripted responses

use super::PageRepository;
use crate::error::RepositoryError;
use crate::types::Page;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Repository that serves pages from memory
///
/// Each page can be scripted to succeed or fail, optionally after a delay.
/// Pages that were never scripted resolve to [`RepositoryError::NotFound`].
/// Every call is counted so callers can assert that a fetch did (or did not)
/// reach the repository.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    responses: HashMap<u32, Result<Page<T>, RepositoryError>>,
    delays: HashMap<u32, Duration>,
    default_delay: Option<Duration>,
    calls: Mutex<HashMap<u32, usize>>,
}

impl<T> InMemoryRepository<T> {
    /// Create a repository with no pages
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            delays: HashMap::new(),
            default_delay: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Serve `page` for its page number
    pub fn with_page(mut self, page: Page<T>) -> Self {
        self.responses.insert(page.page_number, Ok(page));
        self
    }

    /// Fail every fetch of `page_number` with `error`
    pub fn with_failure(mut self, page_number: u32, error: RepositoryError) -> Self {
        self.responses.insert(page_number, Err(error));
        self
    }

    /// Delay fetches of `page_number` by `delay`
    pub fn with_delay(mut self, page_number: u32, delay: Duration) -> Self {
        self.delays.insert(page_number, delay);
        self
    }

    /// Delay fetches of pages without their own delay by `delay`
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Number of fetches of `page_number` so far
    pub fn calls(&self, page_number: u32) -> usize {
        self.calls.lock().get(&page_number).copied().unwrap_or(0)
    }

    /// Number of fetches across all pages so far
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    fn delay_for(&self, page_number: u32) -> Option<Duration> {
        self.delays.get(&page_number).copied().or(self.default_delay)
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> PageRepository<T> for InMemoryRepository<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, page_number: u32) -> Result<Page<T>, RepositoryError> {
        *self.calls.lock().entry(page_number).or_insert(0) += 1;

        if let Some(delay) = self.delay_for(page_number) {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(&page_number) {
            Some(response) => response.clone(),
            None => Err(RepositoryError::NotFound { page: page_number }),
        }
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Movie;
    use std::time::Instant;

    fn movies_page(page_number: u32, titles: &[&str], has_more: bool) -> Page<Movie> {
        let items = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Movie::new(i as u64 + 1, *title))
            .collect();
        Page::new(page_number, items, has_more)
    }

    #[tokio::test]
    async fn serves_scripted_page() {
        let repository = InMemoryRepository::new().with_page(movies_page(1, &["A", "B"], true));

        let page = repository.fetch_page(1).await.unwrap();
        assert_eq!(page, movies_page(1, &["A", "B"], true));
        assert_eq!(repository.calls(1), 1);
    }

    #[tokio::test]
    async fn unscripted_page_is_not_found() {
        let repository = InMemoryRepository::<Movie>::new();

        let err = repository.fetch_page(4).await.unwrap_err();
        assert_eq!(err, RepositoryError::NotFound { page: 4 });
        assert_eq!(repository.calls(4), 1);
    }

    #[tokio::test]
    async fn scripted_failure_is_returned_every_time() {
        let repository = InMemoryRepository::<Movie>::new()
            .with_failure(2, RepositoryError::Network("network unreachable".into()));

        for _ in 0..3 {
            let err = repository.fetch_page(2).await.unwrap_err();
            assert_eq!(err, RepositoryError::Network("network unreachable".into()));
        }
        assert_eq!(repository.calls(2), 3);
        assert_eq!(repository.total_calls(), 3);
    }

    #[tokio::test]
    async fn per_page_delay_overrides_default() {
        let repository = InMemoryRepository::new()
            .with_page(movies_page(1, &["A"], true))
            .with_page(movies_page(2, &["B"], false))
            .with_default_delay(Duration::from_secs(60))
            .with_delay(1, Duration::from_millis(10));

        let started = Instant::now();
        repository.fetch_page(1).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));

        // Page 2 falls back to the long default delay
        let slow = tokio::time::timeout(Duration::from_millis(50), repository.fetch_page(2)).await;
        assert!(slow.is_err(), "default delay should apply to page 2");
    }
}
