//! Error types for freshlist
//!
//! This module provides error handling for the library, including:
//! - The pipeline-level [`Error`] type (config, parse, output I/O)
//! - The [`ApiError`] taxonomy for external lookups (rate limited, not found,
//!   forbidden, unclassified)
//!
//! Lookup failures are classified, never fatal: the fetch engine degrades
//! them to empty results. Only configuration, parsing, and output failures
//! surface as `Err` to the pipeline caller.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for freshlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for freshlist
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// External API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Failed to compile a URL or markdown line pattern
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Classified failure from the external repository API
///
/// The retry protocol keys off this taxonomy: [`RateLimited`](ApiError::RateLimited)
/// retries unconditionally after the limiter resets, [`Forbidden`](ApiError::Forbidden)
/// retries with bounded exponential backoff, everything else is terminal for
/// the affected entry.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Primary rate limit exhausted; retry after the limiter resets
    #[error("rate limit exceeded{}", reset.map(|r| format!(" (resets at {r})")).unwrap_or_default())]
    RateLimited {
        /// Reset instant advertised by the service, when known
        reset: Option<DateTime<Utc>>,
    },

    /// Repository does not exist (deleted, renamed, or never existed)
    #[error("repository not found: {repo}")]
    NotFound {
        /// The repository identifier that was not found
        repo: String,
    },

    /// Access denied; ambiguous, may be secondary rate limiting
    #[error("access denied: {repo}")]
    Forbidden {
        /// The repository identifier the service refused
        repo: String,
    },

    /// Unexpected HTTP status from the service
    #[error("API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or status description
        message: String,
    },

    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("malformed API response: {0}")]
    Decode(String),
}
