//! Page repositories
//!
//! A repository answers one question: "give me page N". The orchestrator is
//! agnostic about where the answer comes from (network, cache, fixture).
//!
//! - [`InMemoryRepository`]: scripted pages with optional delays and failures
//! - [`TimeoutRepository`]: decorator bounding each fetch by a deadline
//!
//! ```no_run
//! use moviehub_fetch::repository::{InMemoryRepository, PageRepository};
//! use moviehub_fetch::{Movie, Page};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryRepository::new()
//!     .with_page(Page::new(1, vec![Movie::new(603, "The Matrix")], true));
//!
//! let page = repository.fetch_page(1).await?;
//! assert_eq!(page.items.len(), 1);
//! # Ok(())
//! # }
//! ```

mod memory;
mod timeout;

pub use memory::InMemoryRepository;
pub use timeout::TimeoutRepository;

use crate::error::RepositoryError;
use crate::types::Page;
use async_trait::async_trait;

/// Source of paginated results
#[async_trait]
pub trait PageRepository<T>: Send + Sync {
    /// Fetch one page
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the page cannot be produced. The
    /// orchestrator forwards it to the caller without retrying.
    async fn fetch_page(&self, page_number: u32) -> Result<Page<T>, RepositoryError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
