//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoint, tolerances, retry tuning)
//! - CLI option types and parsing
//! - Exclusion lists for span accumulation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, Exclusions, LogFormat, LogLevel};
