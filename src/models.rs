//! Batch record types: manifest input and assignment output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geocode::types::Coordinate;

/// One photo record from the input manifest.
///
/// The manifest is produced upstream by whatever extracts metadata from the
/// image files themselves; this pipeline only sees the extracted fields.
/// Every field except the path is optional: a record may lack GPS, a
/// timestamp, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Source path (or any stable identifier) of the photo
    pub path: String,

    /// Signed latitude in degrees
    #[serde(default)]
    pub lat: Option<f64>,

    /// Signed longitude in degrees
    #[serde(default)]
    pub lon: Option<f64>,

    /// Capture timestamp
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
}

impl PhotoRecord {
    /// The record's coordinate, when both axes are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

/// How a record ended up with (or without) a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    /// Resolved from the record's own GPS coordinate
    Gps,
    /// Inferred from the span table by timestamp
    Inferred,
    /// Neither resolution nor inference produced a place
    Unresolved,
}

/// One line of the assignments output: the place a record ended up with.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceAssignment {
    /// The record's path, echoed from the manifest
    pub path: String,
    /// Assigned place label, if any
    pub place: Option<String>,
    /// Assigned country, if any
    pub country: Option<String>,
    /// Provenance of the assignment
    pub source: AssignmentSource,
}
