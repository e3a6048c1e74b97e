//! Snapshot persistence for geocode responses.
//!
//! Every successful remote fetch is written to a JSON file named after the
//! hemisphere-tagged coordinate, so repeated queries for the same coordinate
//! map to the same file. On startup the whole directory is replayed through
//! the normal cache-population path, warm-starting the cache across runs.
//!
//! Persistence is best-effort: a failed write never fails the resolve that
//! triggered it, and a malformed file is skipped during the load pass.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error_handling::{ErrorStats, ErrorType, SnapshotError};

use super::types::{Coordinate, GeocodeResponse};

/// Directory-backed store of raw [`GeocodeResponse`] snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic snapshot file name for a coordinate, combining the
    /// hemisphere references with the magnitudes:
    /// `_N_10.5_E_20.25.json`.
    pub fn file_name(coord: Coordinate) -> String {
        format!(
            "_{}_{}_{}_{}.json",
            coord.lat_ref(),
            coord.lat_abs(),
            coord.lon_ref(),
            coord.lon_abs()
        )
    }

    /// Full path of the snapshot file for a coordinate.
    pub fn file_path(&self, coord: Coordinate) -> PathBuf {
        self.dir.join(Self::file_name(coord))
    }

    /// Loads every `*.json` snapshot in the directory, in file-name order.
    ///
    /// A file that cannot be read or parsed is logged, counted, and skipped;
    /// the rest of the pass continues. A missing directory yields an empty
    /// load.
    pub async fn load_all(&self, stats: &ErrorStats) -> Vec<GeocodeResponse> {
        let mut paths = Vec::new();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "snapshot directory {} not readable, starting cold: {}",
                    self.dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut responses = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.load_one(path).await {
                Ok(response) => responses.push(response),
                Err(e) => {
                    stats.increment(ErrorType::SnapshotReadError);
                    log::warn!("skipping snapshot {}: {}", path.display(), e);
                }
            }
        }

        log::info!(
            "loaded {} snapshot(s) from {}",
            responses.len(),
            self.dir.display()
        );
        responses
    }

    async fn load_one(&self, path: &Path) -> Result<GeocodeResponse, SnapshotError> {
        let body = fs::read_to_string(path).await?;
        let response: GeocodeResponse = serde_json::from_str(&body)?;
        Ok(response)
    }

    /// Serializes a response to the coordinate's snapshot file.
    pub async fn save(
        &self,
        coord: Coordinate,
        response: &GeocodeResponse,
    ) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.file_path(coord);
        let body = serde_json::to_string(response)?;
        fs::write(&path, body).await?;

        log::debug!("saved snapshot {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::types::AddressRecord;
    use tempfile::TempDir;

    fn sample_response(place_id: &str) -> GeocodeResponse {
        GeocodeResponse {
            results: vec![AddressRecord {
                place_id: place_id.to_string(),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_file_name_is_deterministic_and_hemisphere_tagged() {
        let north_east = Coordinate::new(10.5, 20.25);
        assert_eq!(SnapshotStore::file_name(north_east), "_N_10.5_E_20.25.json");

        let south_west = Coordinate::new(-33.9, -70.6);
        assert_eq!(SnapshotStore::file_name(south_west), "_S_33.9_W_70.6.json");

        // Same coordinate, same file.
        assert_eq!(
            SnapshotStore::file_name(north_east),
            SnapshotStore::file_name(Coordinate::new(10.5, 20.25))
        );
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let stats = ErrorStats::new();

        store
            .save(Coordinate::new(10.0, 20.0), &sample_response("P1"))
            .await
            .expect("save should succeed");

        let loaded = store.load_all(&stats).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].results[0].place_id, "P1");
        assert_eq!(stats.get_count(ErrorType::SnapshotReadError), 0);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_skipped_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let stats = ErrorStats::new();

        // One good file surrounded by a bad one; file-name order puts the
        // bad file first so the pass must survive it.
        std::fs::write(dir.path().join("_A_bad.json"), "{corrupt").expect("write");
        store
            .save(Coordinate::new(10.0, 20.0), &sample_response("P1"))
            .await
            .expect("save should succeed");

        let loaded = store.load_all(&stats).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].results[0].place_id, "P1");
        assert_eq!(stats.get_count(ErrorType::SnapshotReadError), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_loads_empty() {
        let store = SnapshotStore::new("/definitely/not/a/real/snapshot/dir");
        let stats = ErrorStats::new();
        assert!(store.load_all(&stats).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_files_are_ignored() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let stats = ErrorStats::new();

        std::fs::write(dir.path().join("notes.txt"), "not a snapshot").expect("write");

        assert!(store.load_all(&stats).await.is_empty());
        assert_eq!(stats.get_count(ErrorType::SnapshotReadError), 0);
    }

    #[tokio::test]
    async fn test_save_overwrites_same_coordinate() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let stats = ErrorStats::new();
        let coord = Coordinate::new(10.0, 20.0);

        store.save(coord, &sample_response("P1")).await.expect("save");
        store.save(coord, &sample_response("P2")).await.expect("save");

        // Redundant fetches for the same coordinate map to one file.
        let loaded = store.load_all(&stats).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].results[0].place_id, "P2");
    }
}
