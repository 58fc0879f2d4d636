//! Unified error handling for the pco-live crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`LiveErrorTrait`] - Common interface implemented by the error types
//! - [`ErrorCategory`] - Classification of errors for host-side handling
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Nothing in this crate retries on its own. `is_recoverable` only tells the
//! host whether pressing the button again has a chance of succeeding.

use thiserror::Error;

pub use crate::utils::error::{ControlError, FetchError, NavError, ProjectionError, RequestError};

/// Common trait for all pco-live error types
pub trait LiveErrorTrait: std::error::Error {
    /// Check if a later attempt of the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport-level failures (connection, status codes)
    Network,
    /// Credentials missing or rejected
    Auth,
    /// Ownership acquisition or release failed
    Control,
    /// Navigation rejected by the server
    Navigation,
    /// Malformed or inconsistent payloads
    Parsing,
    /// Configuration errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short human-readable description of the category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Auth => "authentication error",
            Self::Control => "control error",
            Self::Navigation => "navigation error",
            Self::Parsing => "parsing error",
            Self::Config => "configuration error",
            Self::Other => "other error",
        }
    }
}

impl LiveErrorTrait for RequestError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidCredentials
            | Self::InvalidUrl(_)
            | Self::Unauthorized { .. }
            | Self::NotFound { .. }
            | Self::MalformedBody(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCredentials | Self::Unauthorized { .. } => ErrorCategory::Auth,
            Self::InvalidUrl(_) => ErrorCategory::Config,
            Self::MalformedBody(_) => ErrorCategory::Parsing,
            Self::Transport(_) | Self::NotFound { .. } | Self::Status { .. } => {
                ErrorCategory::Network
            }
        }
    }
}

/// Unified error type for the pco-live crate
#[derive(Error, Debug)]
pub enum Error {
    /// Transport errors
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Catalog load and lookup errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Ownership acquisition/release errors
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    /// Navigation mutation errors
    #[error("Navigation error: {0}")]
    Nav(#[from] NavError),

    /// Live-session projection errors
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl LiveErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_recoverable(),
            Self::Fetch(FetchError::ServiceTypes(e) | FetchError::Plans { source: e, .. }) => {
                e.is_recoverable()
            }
            Self::Fetch(_) => false,
            Self::Control(ControlError::Request { source, .. }) => source.is_recoverable(),
            // Someone toggled between our two calls; pressing again usually wins
            Self::Control(ControlError::NotAcquired { .. }) => true,
            Self::Control(_) => false,
            Self::Nav(NavError::Request(e)) => e.is_recoverable(),
            Self::Nav(_) => false,
            Self::Projection(_) => false,
            Self::Other(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Request(e) => e.category(),
            Self::Fetch(FetchError::ServiceTypes(e) | FetchError::Plans { source: e, .. }) => {
                e.category()
            }
            Self::Fetch(FetchError::UnexpectedShape(_)) => ErrorCategory::Parsing,
            Self::Fetch(_) => ErrorCategory::Other,
            Self::Control(ControlError::Request { source, .. })
                if source.category() == ErrorCategory::Auth =>
            {
                ErrorCategory::Auth
            }
            Self::Control(_) => ErrorCategory::Control,
            Self::Nav(NavError::Request(e)) if e.category() == ErrorCategory::Auth => {
                ErrorCategory::Auth
            }
            Self::Nav(_) => ErrorCategory::Navigation,
            Self::Projection(_) => ErrorCategory::Parsing,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other(context.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
