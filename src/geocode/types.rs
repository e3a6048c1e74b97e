//! Geocoding data structures.
//!
//! This module defines the wire-format types deserialized from the remote
//! geocoding service (and from snapshot files), plus the derived types the
//! rest of the crate works with: resolution levels, signed coordinates, and
//! the per-query `ResolvedPlace` projection.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// Administrative resolution levels, most specific first.
///
/// Each level doubles as a cache partition (see [`crate::geocode::cache`])
/// and as a specificity rank when deriving a place from address components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum AddressLevel {
    /// City-level ("locality")
    Locality,
    /// County-like ("administrative_area_level_2")
    AreaLevel2,
    /// State/province-like ("administrative_area_level_1")
    AreaLevel1,
    /// Country
    Country,
}

impl AddressLevel {
    /// Returns the wire tag the geocoding service uses for this level.
    pub const fn tag(self) -> &'static str {
        match self {
            AddressLevel::Locality => "locality",
            AddressLevel::AreaLevel2 => "administrative_area_level_2",
            AddressLevel::AreaLevel1 => "administrative_area_level_1",
            AddressLevel::Country => "country",
        }
    }

    /// Parses a wire tag back into a level. Non-administrative tags
    /// (e.g. "point_of_interest") return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "locality" => Some(AddressLevel::Locality),
            "administrative_area_level_2" => Some(AddressLevel::AreaLevel2),
            "administrative_area_level_1" => Some(AddressLevel::AreaLevel1),
            "country" => Some(AddressLevel::Country),
            _ => None,
        }
    }

    /// Shard index for the levelled cache.
    pub(crate) const fn index(self) -> usize {
        match self {
            AddressLevel::Locality => 0,
            AddressLevel::AreaLevel2 => 1,
            AddressLevel::AreaLevel1 => 2,
            AddressLevel::Country => 3,
        }
    }
}

/// `location_type` value marking a record whose geometry is a representative
/// point rather than a precise region boundary.
pub const LOCATION_TYPE_GEOMETRIC_CENTER: &str = "GEOMETRIC_CENTER";

/// A single latitude/longitude pair as it appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Signed latitude in degrees
    pub lat: f64,
    /// Signed longitude in degrees
    pub lng: f64,
}

/// Inclusive rectangular extent approximating a region's footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Northeast corner
    pub northeast: LatLng,
    /// Southwest corner
    pub southwest: LatLng,
}

impl Bounds {
    /// Inclusive containment check on both axes.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat <= self.northeast.lat
            && lat >= self.southwest.lat
            && lon <= self.northeast.lng
            && lon >= self.southwest.lng
    }

    /// Latitude extent times longitude extent, in square degrees.
    ///
    /// Used as the deterministic tie-break when several cached regions
    /// contain the same coordinate.
    pub fn area(&self) -> f64 {
        (self.northeast.lat - self.southwest.lat) * (self.northeast.lng - self.southwest.lng)
    }
}

/// Geometry of an address record.
///
/// Exactly one representation applies per record, selected by
/// `location_type`: `GEOMETRIC_CENTER` records match on `location` with an
/// epsilon box, all others match on `bounds`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Bounding box, present for precise regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Representative point, present for approximate records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    /// Geometry kind tag from the service
    #[serde(default)]
    pub location_type: String,
}

impl Geometry {
    /// Whether this geometry is an approximate point rather than a region.
    pub fn is_geometric_center(&self) -> bool {
        self.location_type == LOCATION_TYPE_GEOMETRIC_CENTER
    }
}

/// One named component of an address (a city, a county, a country, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    /// Full display name
    #[serde(default)]
    pub long_name: String,
    /// Abbreviated name
    #[serde(default)]
    pub short_name: String,
    /// Resolution-level tags this component carries
    #[serde(default)]
    pub types: Vec<String>,
}

/// One geocoded place: the unit stored in the levelled cache.
///
/// Immutable once parsed; `place_id` is the cache key and must be non-empty
/// for the record to be storable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Ordered components, most specific first
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    /// Display string for the whole address
    #[serde(default)]
    pub formatted_address: String,
    /// Stable external identifier
    #[serde(default)]
    pub place_id: String,
    /// Spatial extent
    #[serde(default)]
    pub geometry: Geometry,
    /// Tags describing the record's own resolution level
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressRecord {
    /// Whether this record carries the given type tag.
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// A full response from the remote geocoding service: the unit fetched over
/// HTTP and the unit loaded from / written to snapshot files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    /// Address records, most specific first
    #[serde(default)]
    pub results: Vec<AddressRecord>,
}

impl GeocodeResponse {
    /// A response is usable when it parsed and carries at least one record.
    pub fn is_valid(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Place names derived from an address record, one optional field per
/// resolution level. Recomputed per query, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedPlace {
    /// City-level name
    pub city: Option<String>,
    /// County-like name
    pub area_level_2: Option<String>,
    /// State/province-like name
    pub area_level_1: Option<String>,
    /// Country name
    pub country: Option<String>,
}

impl ResolvedPlace {
    /// Derives place names from a record's components.
    pub fn from_record(record: &AddressRecord) -> Self {
        Self::from_components(&record.address_components)
    }

    /// Scans components from least-specific to most-specific position as
    /// stored; the last writer among same-tagged components wins, so the
    /// most specific component carrying each level tag supplies the name.
    /// Blank names are skipped.
    pub fn from_components(components: &[AddressComponent]) -> Self {
        let mut place = ResolvedPlace::default();

        for component in components.iter().rev() {
            if component.long_name.trim().is_empty() {
                continue;
            }
            for tag in &component.types {
                match AddressLevel::from_tag(tag) {
                    Some(AddressLevel::Locality) => {
                        place.city = Some(component.long_name.clone());
                    }
                    Some(AddressLevel::AreaLevel2) => {
                        place.area_level_2 = Some(component.long_name.clone());
                    }
                    Some(AddressLevel::AreaLevel1) => {
                        place.area_level_1 = Some(component.long_name.clone());
                    }
                    Some(AddressLevel::Country) => {
                        place.country = Some(component.long_name.clone());
                    }
                    None => {}
                }
            }
        }

        place
    }

    /// True when no level could be derived.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.area_level_2.is_none()
            && self.area_level_1.is_none()
            && self.country.is_none()
    }

    /// The most specific level with a name, in city > area-2 > area-1 >
    /// country priority order.
    pub fn most_specific_level(&self) -> Option<AddressLevel> {
        if self.city.is_some() {
            Some(AddressLevel::Locality)
        } else if self.area_level_2.is_some() {
            Some(AddressLevel::AreaLevel2)
        } else if self.area_level_1.is_some() {
            Some(AddressLevel::AreaLevel1)
        } else if self.country.is_some() {
            Some(AddressLevel::Country)
        } else {
            None
        }
    }

    /// Display label for the place: the most specific available name.
    pub fn place_label(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.area_level_2.as_deref())
            .or(self.area_level_1.as_deref())
            .or(self.country.as_deref())
    }

    /// Country label, falling back to the place label when the country is
    /// unknown.
    pub fn country_label(&self) -> Option<&str> {
        self.country.as_deref().or_else(|| self.place_label())
    }
}

/// A signed latitude/longitude pair.
///
/// Callers holding hemisphere-referenced magnitudes (EXIF style, `N 10.5`)
/// normalize to the signed form before querying; the hemisphere accessors
/// recover the referenced form for snapshot file naming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Signed latitude in degrees
    pub lat: f64,
    /// Signed longitude in degrees
    pub lon: f64,
}

impl Coordinate {
    /// Creates a signed coordinate.
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// Hemisphere reference for the latitude.
    pub fn lat_ref(self) -> char {
        if self.lat >= 0.0 {
            'N'
        } else {
            'S'
        }
    }

    /// Hemisphere reference for the longitude.
    pub fn lon_ref(self) -> char {
        if self.lon >= 0.0 {
            'E'
        } else {
            'W'
        }
    }

    /// Latitude magnitude.
    pub fn lat_abs(self) -> f64 {
        self.lat.abs()
    }

    /// Longitude magnitude.
    pub fn lon_abs(self) -> f64 {
        self.lon.abs()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
