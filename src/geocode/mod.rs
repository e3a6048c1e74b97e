//! Coordinate-to-place resolution with a hierarchical, snapshot-backed cache.
//!
//! This module family is the core of the crate:
//!
//! - [`types`] — wire-format and derived value types
//! - [`cache`] — the four-level concurrent address cache
//! - [`matcher`] — spatial containment matching
//! - [`client`] — the remote geocoding HTTP client
//! - [`snapshot`] — on-disk persistence of raw responses
//! - [`resolver`] — the lookup/fetch/populate orchestration

pub mod cache;
pub mod client;
pub mod matcher;
pub mod resolver;
pub mod snapshot;
pub mod types;

pub use cache::LevelledCache;
pub use client::GeocodeClient;
pub use matcher::{find_match, matches};
pub use resolver::{populate_from_response, GeocodeResolver, ResolveOutcome};
pub use snapshot::SnapshotStore;
pub use types::{
    AddressComponent, AddressLevel, AddressRecord, Bounds, Coordinate, GeocodeResponse, Geometry,
    LatLng, ResolvedPlace, LOCATION_TYPE_GEOMETRIC_CENTER,
};
