//! photo_places library: place resolution for photo records.
//!
//! This library assigns a place name (city, administrative areas, country)
//! to photo records carrying a GPS coordinate, using a hierarchical,
//! snapshot-backed spatial cache in front of a remote geocoding service. For
//! records without a coordinate it infers a place by correlating their
//! timestamps against a per-place time-span table built from the records
//! that do have one.
//!
//! # Example
//!
//! ```no_run
//! use photo_places::{run_batch, Config};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     manifest: PathBuf::from("photos.jsonl"),
//!     snapshot_dir: PathBuf::from("./geocode_snapshots"),
//!     ..Default::default()
//! };
//!
//! let report = run_batch(config).await?;
//! println!(
//!     "{} records: {} by GPS, {} inferred, {} unresolved",
//!     report.total_records, report.resolved_by_gps, report.inferred_by_time, report.unresolved
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
pub mod geocode;
pub mod inference;
pub mod initialization;
mod models;

// Re-export public API
pub use config::{Config, Exclusions, LogFormat, LogLevel};
pub use error_handling::{
    ClientError, ErrorStats, ErrorType, InitializationError, SnapshotError,
};
pub use geocode::{
    AddressLevel, AddressRecord, Coordinate, GeocodeClient, GeocodeResolver, GeocodeResponse,
    LevelledCache, ResolveOutcome, ResolvedPlace, SnapshotStore,
};
pub use inference::{PlaceSpan, SpanTable, SpanTableBuilder};
pub use models::{AssignmentSource, PhotoRecord, PlaceAssignment};
pub use run::{run_batch, BatchReport};

// Internal run module (contains the batch pipeline)
mod run {
    use std::collections::HashMap;
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use futures::stream::FuturesUnordered;
    use futures::StreamExt;
    use log::{debug, info, warn};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use crate::config::{Config, Exclusions};
    use crate::error_handling::{log_error_statistics, ErrorStats, ErrorType};
    use crate::geocode::{GeocodeClient, GeocodeResolver, ResolveOutcome, SnapshotStore};
    use crate::inference::SpanTableBuilder;
    use crate::initialization::{init_client, init_semaphore};
    use crate::models::{AssignmentSource, PhotoRecord, PlaceAssignment};

    /// Results of a batch run.
    ///
    /// Contains summary statistics about the completed pass over the
    /// manifest.
    #[derive(Debug, Clone)]
    pub struct BatchReport {
        /// Total records read from the manifest
        pub total_records: usize,
        /// Records resolved from their own GPS coordinate
        pub resolved_by_gps: usize,
        /// Records assigned a place by temporal inference
        pub inferred_by_time: usize,
        /// Records left without a place
        pub unresolved: usize,
        /// Remote geocode fetches issued
        pub remote_fetches: usize,
        /// Place spans built from GPS-resolved records
        pub span_count: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs the batch pipeline with the provided configuration.
    ///
    /// This is the main entry point for the library. It warm-starts the
    /// cache from the snapshot directory, reads photo records from the
    /// manifest, resolves GPS-bearing records concurrently, builds the
    /// place span table, assigns places to the remaining records by
    /// temporal containment, and optionally writes per-record assignments.
    ///
    /// The two inference phases never interleave: every GPS-bearing record
    /// completes resolution and span accumulation before the first
    /// place-less record is considered.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be opened, the exclusions
    /// file cannot be parsed, or the assignments output cannot be written.
    /// Remote fetch and snapshot failures are not errors; they degrade and
    /// are counted.
    pub async fn run_batch(config: Config) -> Result<BatchReport> {
        let start_time = std::time::Instant::now();
        let stats = Arc::new(ErrorStats::new());

        let exclusions = match &config.exclusions {
            Some(path) => Exclusions::load(path).await?,
            None => Exclusions::default(),
        };

        let http = init_client().context("Failed to initialize HTTP client")?;
        let client =
            GeocodeClient::with_base_url(http, config.api_key.clone(), config.geocode_url.clone());
        let snapshots = SnapshotStore::new(&config.snapshot_dir);
        let resolver =
            GeocodeResolver::with_warm_start(client, snapshots, Arc::clone(&stats)).await;

        let records = read_manifest(&config, &stats).await?;
        info!(
            "loaded {} photo record(s) from {}",
            records.len(),
            config.manifest.display()
        );

        // Resolve every GPS-bearing record, bounded by the semaphore. The
        // whole set is joined before span accumulation starts.
        let semaphore = init_semaphore(config.max_concurrency);
        let mut tasks = FuturesUnordered::new();
        for (index, record) in records.iter().enumerate() {
            let Some(coord) = record.coordinate() else {
                continue;
            };
            let resolver = &resolver;
            let semaphore = Arc::clone(&semaphore);
            tasks.push(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                (index, resolver.resolve(coord).await)
            });
        }

        let mut outcomes: HashMap<usize, ResolveOutcome> = HashMap::new();
        while let Some((index, outcome)) = tasks.next().await {
            outcomes.insert(index, outcome);
        }

        // Phase 1: accumulate place spans from the resolved records.
        let mut builder = SpanTableBuilder::new(config.span_limit_days);
        for (index, record) in records.iter().enumerate() {
            let Some(place) = outcomes.get(&index).and_then(|o| o.place()) else {
                continue;
            };
            let Some(label) = place.place_label() else {
                continue;
            };
            let Some(taken_at) = record.taken_at else {
                stats.increment(ErrorType::MissingTimestamp);
                continue;
            };

            if exclusions.is_place_excluded(label) {
                debug!("place {} is excluded from span accumulation", label);
                continue;
            }
            if let Some(coord) = record.coordinate() {
                if exclusions.is_coordinate_excluded(coord) {
                    debug!("coordinate {} is excluded from span accumulation", coord);
                    continue;
                }
            }

            let country = place.country_label().unwrap_or(label).to_string();
            builder.observe(label, &country, taken_at);
        }

        let span_table = builder.freeze();
        info!(
            "built {} place span(s) from GPS-resolved records",
            span_table.len()
        );

        // Phase 2: assign places to records that have none, against the
        // frozen table.
        let mut resolved_by_gps = 0usize;
        let mut inferred_by_time = 0usize;
        let mut unresolved = 0usize;
        let mut assignments = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let gps_place = outcomes
                .get(&index)
                .and_then(|o| o.place())
                .filter(|place| place.place_label().is_some());

            let assignment = match gps_place {
                Some(place) => {
                    resolved_by_gps += 1;
                    PlaceAssignment {
                        path: record.path.clone(),
                        place: place.place_label().map(str::to_string),
                        country: place.country_label().map(str::to_string),
                        source: AssignmentSource::Gps,
                    }
                }
                None => match record.taken_at.and_then(|t| span_table.assign(t)) {
                    Some((place, country)) => {
                        inferred_by_time += 1;
                        PlaceAssignment {
                            path: record.path.clone(),
                            place: Some(place.to_string()),
                            country: Some(country.to_string()),
                            source: AssignmentSource::Inferred,
                        }
                    }
                    None => {
                        unresolved += 1;
                        debug!("no place for {}", record.path);
                        PlaceAssignment {
                            path: record.path.clone(),
                            place: None,
                            country: None,
                            source: AssignmentSource::Unresolved,
                        }
                    }
                },
            };
            assignments.push(assignment);
        }

        if let Some(output) = &config.output {
            write_assignments(output, &assignments).await?;
            info!("wrote {} assignment(s) to {}", assignments.len(), output.display());
        }

        log_error_statistics(&stats);

        Ok(BatchReport {
            total_records: records.len(),
            resolved_by_gps,
            inferred_by_time,
            unresolved,
            remote_fetches: resolver.remote_fetch_count(),
            span_count: span_table.len(),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    async fn read_manifest(config: &Config, stats: &ErrorStats) -> Result<Vec<PhotoRecord>> {
        let file = tokio::fs::File::open(&config.manifest)
            .await
            .with_context(|| format!("Failed to open manifest {}", config.manifest.display()))?;
        let mut lines = BufReader::new(file).lines();

        let mut records = Vec::new();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<PhotoRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    stats.increment(ErrorType::ManifestParseError);
                    warn!("skipping malformed manifest line: {}", e);
                }
            }
        }
        Ok(records)
    }

    async fn write_assignments(
        path: &std::path::Path,
        assignments: &[PlaceAssignment],
    ) -> Result<()> {
        let mut body = String::new();
        for assignment in assignments {
            body.push_str(&serde_json::to_string(assignment)?);
            body.push('\n');
        }

        let mut file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        file.write_all(body.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
