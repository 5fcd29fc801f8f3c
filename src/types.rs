//! Core types for moviehub-fetch

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unique identifier for one in-flight fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(pub u64);

impl HandleId {
    /// Create a new HandleId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for HandleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<HandleId> for u64 {
    fn from(id: HandleId) -> Self {
        id.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated request for one page of results
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page_number: u32,
}

impl PageRequest {
    /// Validate a caller-supplied page number
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `page_number` is negative or does
    /// not fit in a `u32`.
    pub fn new(page_number: i64) -> Result<Self> {
        if page_number < 0 {
            return Err(Error::invalid_argument(
                "page_number",
                format!("must be non-negative, got {page_number}"),
            ));
        }
        let page_number = u32::try_from(page_number).map_err(|_| {
            Error::invalid_argument(
                "page_number",
                format!("must not exceed {}, got {page_number}", u32::MAX),
            )
        })?;
        Ok(Self { page_number })
    }

    /// The requested page
    pub fn page_number(&self) -> u32 {
        self.page_number
    }
}

/// One page of results as produced by a repository
///
/// The orchestrator never looks inside; it hands the page to the caller as is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in repository order
    pub items: Vec<T>,
    /// The page number this payload answers
    pub page_number: u32,
    /// Whether the repository has further pages after this one
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(page_number: u32, items: Vec<T>, has_more: bool) -> Self {
        Self {
            items,
            page_number,
            has_more,
        }
    }

    /// Whether this is the final page
    pub fn is_last_page(&self) -> bool {
        !self.has_more
    }
}

/// A movie as listed in the popular-movies catalogue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Catalogue identifier
    pub id: u64,
    /// Display title
    pub title: String,
    /// Short synopsis
    #[serde(default)]
    pub overview: String,
    /// Relative path of the poster image, if any
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Theatrical release date, if known
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Average user rating (0.0 - 10.0)
    #[serde(default)]
    pub vote_average: f32,
}

impl Movie {
    /// Create a movie with only an id and title set
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            release_date: None,
            vote_average: 0.0,
        }
    }

    /// Release year, if the release date is known
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }
}

/// A page of popular movies
pub type MoviesPage = Page<Movie>;

/// Lifecycle events emitted by the orchestrator
///
/// Consumers subscribe via [`FetchOrchestrator::subscribe`](crate::FetchOrchestrator::subscribe).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    /// A fetch was issued and its handle registered
    Issued {
        /// Handle of the fetch
        id: HandleId,
        /// Requested page
        page: u32,
    },

    /// A fetch settled successfully and the result was delivered
    Completed {
        /// Handle of the fetch
        id: HandleId,
        /// Requested page
        page: u32,
        /// Number of items on the page
        item_count: usize,
        /// Whether more pages follow
        has_more: bool,
    },

    /// A fetch settled with a repository error and the error was delivered
    Failed {
        /// Handle of the fetch
        id: HandleId,
        /// Requested page
        page: u32,
        /// Machine-readable error code
        code: String,
        /// Error message
        error: String,
    },

    /// A fetch was cancelled before it settled; nothing was delivered
    Cancelled {
        /// Handle of the fetch
        id: HandleId,
        /// Requested page
        page: u32,
    },

    /// The orchestrator shut down
    Shutdown,
}
