//! Error types for moviehub-fetch
//!
//! This module provides the error handling for the library:
//! - [`Error`] for everything the orchestrator reports to callers
//! - [`RepositoryError`] for failures raised by a [`PageRepository`](crate::PageRepository)
//! - Machine-readable error codes for logs and events

use std::time::Duration;
use thiserror::Error;

/// Result type alias for moviehub-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for moviehub-fetch
///
/// Cancellation of a callback-based request is silent and never produces an
/// error value; [`Error::Cancelled`] is only returned by the awaitable
/// [`FetchOrchestrator::fetch_page`](crate::FetchOrchestrator::fetch_page).
#[derive(Debug, Error)]
pub enum Error {
    /// A request argument was rejected before any asynchronous work started
    #[error("invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument (e.g., "page_number")
        argument: &'static str,
        /// Human-readable description of the constraint that was violated
        message: String,
    },

    /// The repository resolved the fetch with an error
    #[error("fetch of page {page} failed: {source}")]
    FetchFailed {
        /// The page that was requested
        page: u32,
        /// The error reported by the repository
        #[source]
        source: RepositoryError,
    },

    /// The fetch was cancelled before it settled
    #[error("fetch of page {page} was cancelled")]
    Cancelled {
        /// The page that was requested
        page: u32,
    },

    /// Shutdown in progress - not accepting new requests
    #[error("shutdown in progress: not accepting new requests")]
    ShuttingDown,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "event_channel_capacity")
        key: Option<String>,
    },

    /// No async runtime was available to run fetches on
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Errors raised by a page repository
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    /// The data source could not be reached
    #[error("{0}")]
    Network(String),

    /// The fetch did not settle within the configured timeout
    #[error("page {page} timed out after {after:?}")]
    Timeout {
        /// The page that was requested
        page: u32,
        /// How long the fetch was allowed to run
        after: Duration,
    },

    /// The data source has no such page
    #[error("page {page} not found")]
    NotFound {
        /// The page that was requested
        page: u32,
    },

    /// The repository panicked while fetching
    #[error("repository panicked: {0}")]
    Panicked(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an [`Error::InvalidArgument`]
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Create an [`Error::Config`] for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidArgument { .. } => "invalid_argument",
            Error::FetchFailed { source, .. } => source.error_code(),
            Error::Cancelled { .. } => "cancelled",
            Error::ShuttingDown => "shutting_down",
            Error::Config { .. } => "config_error",
            Error::Runtime(_) => "runtime_error",
        }
    }

    /// The repository error behind a [`Error::FetchFailed`], if any
    pub fn repository_error(&self) -> Option<&RepositoryError> {
        match self {
            Error::FetchFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl RepositoryError {
    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::Network(_) => "network_error",
            RepositoryError::Timeout { .. } => "timeout",
            RepositoryError::NotFound { .. } => "page_not_found",
            RepositoryError::Panicked(_) => "repository_panicked",
            RepositoryError::Other(_) => "repository_error",
        }
    }
}
