//! # moviehub-fetch
//!
//! Cancellable paginated fetch orchestration for movie catalogue use cases.
//!
//! ## Design Philosophy
//!
//! moviehub-fetch is designed to be:
//! - **Single-flight per request** - Every request settles at most once, and its
//!   callback fires at most once
//! - **Cancellable as a group** - One call silences every outstanding fetch
//! - **Observable** - Busy/idle transitions go to an injected [`IdleSignal`],
//!   lifecycle events to broadcast subscribers
//! - **Library-first** - No transport, no UI; repositories are plugged in
//!
//! ## Quick Start
//!
//! ```no_run
//! use moviehub_fetch::{
//!     Config, FetchOrchestrator, InMemoryRepository, Movie, NoOpIdleSignal, Page,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = InMemoryRepository::new().with_page(Page::new(
//!         1,
//!         vec![Movie::new(603, "The Matrix"), Movie::new(550, "Fight Club")],
//!         true,
//!     ));
//!
//!     let orchestrator = FetchOrchestrator::<Movie>::new(
//!         Arc::new(repository),
//!         Arc::new(NoOpIdleSignal),
//!         Config::default(),
//!     )?;
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let page = orchestrator.fetch_page(1).await?;
//!     println!("{} movies, more pages: {}", page.items.len(), page.has_more);
//!
//!     orchestrator.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Busy/idle signalling
pub mod idle;
/// Fetch orchestration (decomposed into focused submodules)
pub mod orchestrator;
/// Page repositories
pub mod repository;
/// Cancellable handles and subscription groups
pub mod subscription;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchConfig};
pub use error::{Error, RepositoryError, Result};
pub use idle::{CountingIdleSignal, IdleSignal, NoOpIdleSignal};
pub use orchestrator::FetchOrchestrator;
pub use repository::{InMemoryRepository, PageRepository, TimeoutRepository};
pub use subscription::{CancellableHandle, SubscriptionGroup};
pub use types::{FetchEvent, HandleId, Movie, MoviesPage, Page, PageRequest};
