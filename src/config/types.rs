//! Configuration types and CLI options.
//!
//! This module defines the run configuration, the logging enums used for
//! command-line argument parsing, and the optional exclusion lists that
//! suppress span accumulation for named places or areas.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::config::constants::{
    API_KEY_ENV, DEFAULT_MAX_CONCURRENCY, DEFAULT_SNAPSHOT_DIR, DEFAULT_SPAN_LIMIT_DAYS,
    GEOCODE_URL_BASE,
};
use crate::geocode::types::{Bounds, Coordinate};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Run configuration.
///
/// Parsed from the command line by the binary; library callers can
/// construct it directly (`Config { ..Default::default() }`).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "photo_places",
    about = "Assigns place names to photo records from GPS coordinates, with temporal inference for records without GPS"
)]
pub struct Config {
    /// JSON-lines manifest of photo records to process
    #[arg(long, default_value = "photos.jsonl")]
    pub manifest: PathBuf,

    /// Directory holding raw geocode response snapshots
    #[arg(long, default_value = DEFAULT_SNAPSHOT_DIR)]
    pub snapshot_dir: PathBuf,

    /// Geocoding API key
    #[arg(long, env = API_KEY_ENV, default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the geocoding service (override for proxies or tests)
    #[arg(long, default_value = GEOCODE_URL_BASE, hide = true)]
    pub geocode_url: String,

    /// Widening tolerance for place time spans, in days
    #[arg(long, default_value_t = DEFAULT_SPAN_LIMIT_DAYS)]
    pub span_limit_days: i64,

    /// Maximum concurrent resolutions
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Write per-record place assignments to this JSONL file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// JSON file with places/areas excluded from span accumulation
    #[arg(long)]
    pub exclusions: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("photos.jsonl"),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            api_key: String::new(),
            geocode_url: GEOCODE_URL_BASE.to_string(),
            span_limit_days: DEFAULT_SPAN_LIMIT_DAYS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            output: None,
            exclusions: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Places and areas whose sightings should not contribute to the span
/// table.
///
/// A layover city or an airport area otherwise produces a span that
/// swallows every non-GPS photo taken that week; listing it here keeps the
/// sighting out of the table while still resolving the photo itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Exclusions {
    /// Place names excluded by case-insensitive match
    #[serde(default)]
    pub excluded_places: Vec<String>,

    /// Areas excluded by inclusive coordinate containment
    #[serde(default)]
    pub excluded_areas: Vec<Bounds>,
}

impl Exclusions {
    /// Loads exclusions from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read exclusions file {}", path.display()))?;
        let exclusions = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse exclusions file {}", path.display()))?;
        Ok(exclusions)
    }

    /// Whether a place name is excluded (case-insensitive).
    pub fn is_place_excluded(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.excluded_places
            .iter()
            .any(|excluded| excluded.to_lowercase() == lowered)
    }

    /// Whether a coordinate falls inside any excluded area.
    pub fn is_coordinate_excluded(&self, coord: Coordinate) -> bool {
        self.excluded_areas
            .iter()
            .any(|area| area.contains(coord.lat, coord.lon))
    }
}
