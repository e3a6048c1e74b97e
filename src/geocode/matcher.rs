//! Spatial containment matching against cached records.
//!
//! A coordinate matches a record either by falling inside its bounding box
//! (inclusive on all edges) or, for `GEOMETRIC_CENTER` records, by lying
//! within an epsilon box around the representative point.
//!
//! When several cached regions contain the same coordinate the smallest one
//! wins, with `place_id` order as the final tie-break, so overlapping
//! regions resolve the same way on every run regardless of cache iteration
//! order.

use crate::config::CENTER_EPSILON_DEGREES;

use super::types::{AddressRecord, Coordinate};

/// Area of the epsilon box a `GEOMETRIC_CENTER` record occupies for
/// tie-break purposes.
const CENTER_BOX_AREA: f64 = (2.0 * CENTER_EPSILON_DEGREES) * (2.0 * CENTER_EPSILON_DEGREES);

/// Does the coordinate fall inside the record's extent?
///
/// `GEOMETRIC_CENTER` records match when both axes are within
/// `CENTER_EPSILON_DEGREES` of the center, independently and inclusively.
/// All other records match by inclusive bounding-box containment. A record
/// missing the geometry its `location_type` selects never matches.
pub fn matches(coord: Coordinate, record: &AddressRecord) -> bool {
    let geometry = &record.geometry;

    if geometry.is_geometric_center() {
        match &geometry.location {
            Some(center) => {
                (coord.lat - center.lat).abs() <= CENTER_EPSILON_DEGREES
                    && (coord.lon - center.lng).abs() <= CENTER_EPSILON_DEGREES
            }
            None => false,
        }
    } else {
        match &geometry.bounds {
            Some(bounds) => bounds.contains(coord.lat, coord.lon),
            None => false,
        }
    }
}

/// Scans one level's entries and returns the best-matching record, if any.
///
/// "Best" is the matching record with the smallest spatial extent; ties
/// break on the lexicographically smallest `place_id`.
pub fn find_match(coord: Coordinate, entries: &[(String, AddressRecord)]) -> Option<AddressRecord> {
    let mut best: Option<(f64, &str, &AddressRecord)> = None;

    for (place_id, record) in entries {
        if !matches(coord, record) {
            continue;
        }

        let area = extent_area(record);
        let better = match best {
            None => true,
            Some((best_area, best_id, _)) => {
                area < best_area || (area == best_area && place_id.as_str() < best_id)
            }
        };
        if better {
            best = Some((area, place_id.as_str(), record));
        }
    }

    best.map(|(_, place_id, record)| {
        log::debug!(
            "spatial match for {}: {} ({})",
            coord,
            place_id,
            record.formatted_address
        );
        record.clone()
    })
}

fn extent_area(record: &AddressRecord) -> f64 {
    if record.geometry.is_geometric_center() {
        CENTER_BOX_AREA
    } else {
        record
            .geometry
            .bounds
            .as_ref()
            .map(|bounds| bounds.area())
            .unwrap_or(f64::INFINITY)
    }
}
