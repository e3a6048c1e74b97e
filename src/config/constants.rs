//! Configuration constants.
//!
//! This module defines the operational constants used throughout the
//! pipeline: the remote endpoint, matching tolerances, retry tuning, and
//! default limits.

/// Reverse-geocoding endpoint queried for unresolved coordinates.
pub const GEOCODE_URL_BASE: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Environment variable the API key is read from when not passed as a flag.
pub const API_KEY_ENV: &str = "GEOCODE_API_KEY";

/// Matching tolerance, in degrees, around a `GEOMETRIC_CENTER` point.
///
/// Applied to both axes independently and inclusively: a coordinate within
/// 0.01 degrees of the center on latitude AND longitude matches. Roughly a
/// kilometer at the equator, which is about the precision the point-style
/// geometry carries anyway.
pub const CENTER_EPSILON_DEGREES: f64 = 0.01;

/// Default widening tolerance for place time spans, in days.
///
/// A sighting further than this from a span's edge does not widen it; it is
/// taken to belong to a separate visit.
pub const DEFAULT_SPAN_LIMIT_DAYS: i64 = 3;

/// Default directory for geocode response snapshots.
pub const DEFAULT_SNAPSHOT_DIR: &str = "./geocode_snapshots";

/// Default bound on concurrent resolutions (semaphore limit).
///
/// Each in-flight resolution holds at most one remote request, so this also
/// bounds pressure on the geocoding service.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Per-request HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 2;
