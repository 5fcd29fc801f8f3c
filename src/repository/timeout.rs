//! Timeout decorator for repositories

use super::PageRepository;
use crate::error::RepositoryError;
use crate::types::Page;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Repository decorator that fails fetches running longer than a deadline
///
/// Timeouts are not part of the orchestrator's contract; callers that want
/// one wrap their repository with this type (or set
/// [`FetchConfig::fetch_timeout`](crate::config::FetchConfig::fetch_timeout)).
pub struct TimeoutRepository<T> {
    inner: Arc<dyn PageRepository<T>>,
    timeout: Duration,
}

impl<T> TimeoutRepository<T> {
    /// Wrap `inner`, bounding every fetch by `timeout`
    pub fn new(inner: Arc<dyn PageRepository<T>>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The configured deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<T> PageRepository<T> for TimeoutRepository<T>
where
    T: Send + 'static,
{
    async fn fetch_page(&self, page_number: u32) -> Result<Page<T>, RepositoryError> {
        match tokio::time::timeout(self.timeout, self.inner.fetch_page(page_number)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    page = page_number,
                    timeout_ms = self.timeout.as_millis() as u64,
                    repository = self.inner.name(),
                    "Page fetch timed out"
                );
                Err(RepositoryError::Timeout {
                    page: page_number,
                    after: self.timeout,
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "timeout"
    }
}
