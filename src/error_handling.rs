//! Error types and non-fatal failure accounting.
//!
//! Most failures in this pipeline degrade rather than abort: a failed
//! remote fetch falls back to a coarser cache level, a corrupt snapshot is
//! skipped, an unresolvable record is routed to temporal inference. Those
//! degradations are counted per [`ErrorType`] in [`ErrorStats`] and
//! reported at the end of a run instead of propagating as errors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::SetLoggerError;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::{RETRY_FACTOR, RETRY_INITIAL_DELAY_MS, RETRY_MAX_DELAY_SECS};

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

/// Errors from the remote geocoding client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (after retries) or non-success status.
    #[error("geocode request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a blank body.
    #[error("geocode response body was empty")]
    EmptyBody,

    /// The body was not a well-formed geocode response.
    #[error("failed to parse geocode response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from snapshot persistence.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Filesystem failure reading or writing a snapshot.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be serialized or deserialized.
    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Non-fatal degradations tracked across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[allow(missing_docs)] // Variant names are the documentation
pub enum ErrorType {
    RemoteFetchError,
    RemoteEmptyResult,
    SnapshotReadError,
    SnapshotWriteError,
    ManifestParseError,
    MissingTimestamp,
    UnresolvedCoordinate,
}

impl ErrorType {
    /// Human-readable label for reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::RemoteFetchError => "Remote geocode fetch error",
            ErrorType::RemoteEmptyResult => "Remote geocode empty result",
            ErrorType::SnapshotReadError => "Snapshot read error",
            ErrorType::SnapshotWriteError => "Snapshot write error",
            ErrorType::ManifestParseError => "Manifest parse error",
            ErrorType::MissingTimestamp => "Record missing timestamp",
            ErrorType::UnresolvedCoordinate => "Unresolved coordinate",
        }
    }
}

/// Thread-safe counters for non-fatal degradations.
///
/// All error types are initialized to zero on creation, so incrementing is
/// lock-free. Share across tasks with `Arc`.
pub struct ErrorStats {
    errors: HashMap<ErrorType, AtomicUsize>,
}

impl ErrorStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }
        ErrorStats { errors }
    }

    /// Increments one counter.
    pub fn increment(&self, error: ErrorType) {
        // All ErrorType variants are initialized in new(), so unwrap() is safe
        self.errors
            .get(&error)
            .unwrap()
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Reads one counter.
    pub fn get_count(&self, error: ErrorType) -> usize {
        // All ErrorType variants are initialized in new(), so unwrap() is safe
        self.errors.get(&error).unwrap().load(Ordering::SeqCst)
    }
}

impl Default for ErrorStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs every non-zero degradation counter at the end of a run.
pub fn log_error_statistics(stats: &ErrorStats) {
    for error_type in ErrorType::iter() {
        let count = stats.get_count(error_type);
        if count > 0 {
            log::warn!("{}: {}", error_type.as_str(), count);
        }
    }
}

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
pub fn get_retry_strategy() -> ExponentialBackoff {
    ExponentialBackoff::from_millis(RETRY_INITIAL_DELAY_MS)
        .factor(RETRY_FACTOR)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
}
