//! Coordinate-to-place resolution.
//!
//! The resolver front-ends the levelled cache: a city-level spatial hit is
//! answered locally, a full miss falls through to the remote service, and a
//! valid remote response populates the cache (and the snapshot store) for
//! every administrative level it mentions. Remote failure degrades to the
//! best parent-level hit found on the way down, or to an unresolved outcome.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::error_handling::{ErrorStats, ErrorType};

use super::cache::LevelledCache;
use super::client::GeocodeClient;
use super::matcher::find_match;
use super::snapshot::SnapshotStore;
use super::types::{AddressLevel, Coordinate, GeocodeResponse, ResolvedPlace};

/// Parent levels probed, most specific first, when the city level misses.
const PARENT_LEVELS: [AddressLevel; 3] = [
    AddressLevel::AreaLevel2,
    AddressLevel::AreaLevel1,
    AddressLevel::Country,
];

/// Outcome of a resolution attempt, recording where the answer came from.
///
/// Failure to resolve is an outcome, not an error: the caller routes
/// unresolved records to the temporal-inference fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Answered from the city-level cache; no remote call was made.
    CacheHit(ResolvedPlace),
    /// Answered from a fresh remote fetch.
    Fetched(ResolvedPlace),
    /// Remote fetch failed or was unusable; answered from a parent-level
    /// cache hit (area-2, area-1, or country).
    ParentFallback(ResolvedPlace),
    /// Nothing in the cache contained the coordinate and the remote fetch
    /// produced nothing usable.
    Unresolved,
}

impl ResolveOutcome {
    /// The resolved place, if any.
    pub fn place(&self) -> Option<&ResolvedPlace> {
        match self {
            ResolveOutcome::CacheHit(place)
            | ResolveOutcome::Fetched(place)
            | ResolveOutcome::ParentFallback(place) => Some(place),
            ResolveOutcome::Unresolved => None,
        }
    }

    /// Consumes the outcome, yielding the resolved place, if any.
    pub fn into_place(self) -> Option<ResolvedPlace> {
        match self {
            ResolveOutcome::CacheHit(place)
            | ResolveOutcome::Fetched(place)
            | ResolveOutcome::ParentFallback(place) => Some(place),
            ResolveOutcome::Unresolved => None,
        }
    }
}

/// Resolves coordinates to places through the cache, the remote service,
/// and the snapshot store.
///
/// Constructed once per process and shared by reference; there is no hidden
/// global state. `resolve` is safe under concurrent callers: redundant
/// remote fetches for the same coordinate may race, but cache insertion is
/// first-writer-wins per `place_id` so the final state is unaffected.
pub struct GeocodeResolver {
    cache: Arc<LevelledCache>,
    client: GeocodeClient,
    snapshots: SnapshotStore,
    stats: Arc<ErrorStats>,
    remote_fetches: AtomicUsize,
}

impl GeocodeResolver {
    /// Creates a resolver with an empty cache.
    pub fn new(client: GeocodeClient, snapshots: SnapshotStore, stats: Arc<ErrorStats>) -> Self {
        GeocodeResolver {
            cache: Arc::new(LevelledCache::new()),
            client,
            snapshots,
            stats,
            remote_fetches: AtomicUsize::new(0),
        }
    }

    /// Creates a resolver and warm-starts its cache by replaying every
    /// stored snapshot through the normal population path.
    pub async fn with_warm_start(
        client: GeocodeClient,
        snapshots: SnapshotStore,
        stats: Arc<ErrorStats>,
    ) -> Self {
        let resolver = Self::new(client, snapshots, stats);

        let responses = resolver.snapshots.load_all(&resolver.stats).await;
        for response in &responses {
            if response.is_valid() {
                populate_from_response(&resolver.cache, response);
            }
        }

        log::info!(
            "warm start: {} cached record(s) across levels",
            resolver.cache.total_len()
        );
        resolver
    }

    /// The cache backing this resolver.
    pub fn cache(&self) -> &LevelledCache {
        &self.cache
    }

    /// Number of remote fetches issued so far.
    pub fn remote_fetch_count(&self) -> usize {
        self.remote_fetches.load(Ordering::SeqCst)
    }

    /// Resolves a coordinate to a place.
    ///
    /// 1. A city-level spatial hit returns immediately with no remote call
    ///    and no cache write.
    /// 2. Otherwise the parent levels (area-2, area-1, country) are probed
    ///    and the first hit remembered as a fallback.
    /// 3. A remote fetch is issued; a valid response is snapshotted,
    ///    populates the cache, and supplies the answer.
    /// 4. On fetch failure the parent fallback answers, or the outcome is
    ///    `Unresolved`.
    pub async fn resolve(&self, coord: Coordinate) -> ResolveOutcome {
        if let Some(hit) = find_match(coord, &self.cache.scan(AddressLevel::Locality)) {
            return ResolveOutcome::CacheHit(ResolvedPlace::from_record(&hit));
        }

        let mut parent_fallback = None;
        for level in PARENT_LEVELS {
            if let Some(hit) = find_match(coord, &self.cache.scan(level)) {
                parent_fallback = Some(hit);
                break;
            }
        }

        self.remote_fetches.fetch_add(1, Ordering::SeqCst);
        match self.client.fetch(coord).await {
            Ok(response) if response.is_valid() => {
                if let Err(e) = self.snapshots.save(coord, &response).await {
                    self.stats.increment(ErrorType::SnapshotWriteError);
                    log::warn!("failed to persist snapshot for {}: {}", coord, e);
                }

                match populate_from_response(&self.cache, &response) {
                    Some(place) => ResolveOutcome::Fetched(place),
                    None => self.fall_back(coord, parent_fallback),
                }
            }
            Ok(_) => {
                self.stats.increment(ErrorType::RemoteEmptyResult);
                log::warn!("remote geocode returned no results for {}", coord);
                self.fall_back(coord, parent_fallback)
            }
            Err(e) => {
                self.stats.increment(ErrorType::RemoteFetchError);
                log::warn!("remote geocode failed for {}: {}", coord, e);
                self.fall_back(coord, parent_fallback)
            }
        }
    }

    fn fall_back(
        &self,
        coord: Coordinate,
        parent: Option<super::types::AddressRecord>,
    ) -> ResolveOutcome {
        match parent {
            Some(record) => {
                ResolveOutcome::ParentFallback(ResolvedPlace::from_record(&record))
            }
            None => {
                self.stats.increment(ErrorType::UnresolvedCoordinate);
                log::debug!("{} is unresolved", coord);
                ResolveOutcome::Unresolved
            }
        }
    }
}

/// Populates the cache from one valid response; returns the place derived
/// from the top (most specific) record, or `None` for an empty response.
///
/// Every record is inserted at every administrative level its tags name,
/// provided the derived place has a target level at all — a response whose
/// top record derives no level populates nothing administrative. When the
/// top record's geometry is a geometric center (a point of interest), the
/// records carrying its leading type tag are additionally cached under the
/// level that tag names, defaulting to the city level for tags outside the
/// administrative hierarchy.
pub fn populate_from_response(
    cache: &LevelledCache,
    response: &GeocodeResponse,
) -> Option<ResolvedPlace> {
    let top = response.results.first()?;
    let place = ResolvedPlace::from_record(top);

    match place.most_specific_level() {
        Some(target) => {
            log::debug!("populating cache, target level {:?}", target);
            for record in &response.results {
                for level in AddressLevel::iter() {
                    if record.has_type(level.tag()) {
                        cache.try_insert(level, record.clone());
                    }
                }
            }
        }
        None => {
            log::debug!("top record derives no administrative level, skipping population");
        }
    }

    if top.geometry.is_geometric_center() {
        if let Some(tag) = top.types.first() {
            let level = AddressLevel::from_tag(tag).unwrap_or(AddressLevel::Locality);
            for record in &response.results {
                if record.has_type(tag) {
                    cache.try_insert(level, record.clone());
                }
            }
        }
    }

    Some(place)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::types::{
        AddressComponent, AddressRecord, Bounds, Geometry, LatLng, LOCATION_TYPE_GEOMETRIC_CENTER,
    };

    fn component(long_name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: long_name.to_string(),
            short_name: long_name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn city_record() -> AddressRecord {
        AddressRecord {
            place_id: "city-1".to_string(),
            formatted_address: "Springfield, Freedonia".to_string(),
            address_components: vec![
                component("Springfield", &["locality"]),
                component("Freedonia", &["country"]),
            ],
            geometry: Geometry {
                bounds: Some(Bounds {
                    northeast: LatLng { lat: 10.01, lng: 20.01 },
                    southwest: LatLng { lat: 9.99, lng: 19.99 },
                }),
                location: None,
                location_type: "APPROXIMATE".to_string(),
            },
            types: vec!["locality".to_string()],
        }
    }

    fn country_record() -> AddressRecord {
        AddressRecord {
            place_id: "country-1".to_string(),
            formatted_address: "Freedonia".to_string(),
            address_components: vec![component("Freedonia", &["country"])],
            geometry: Geometry {
                bounds: Some(Bounds {
                    northeast: LatLng { lat: 15.0, lng: 25.0 },
                    southwest: LatLng { lat: 5.0, lng: 15.0 },
                }),
                location: None,
                location_type: "APPROXIMATE".to_string(),
            },
            types: vec!["country".to_string()],
        }
    }

    #[test]
    fn test_populate_inserts_each_record_at_its_levels() {
        let cache = LevelledCache::new();
        let response = GeocodeResponse {
            results: vec![city_record(), country_record()],
        };

        let place = populate_from_response(&cache, &response).expect("top record exists");
        assert_eq!(place.city.as_deref(), Some("Springfield"));
        assert_eq!(place.country.as_deref(), Some("Freedonia"));

        assert_eq!(cache.len(AddressLevel::Locality), 1);
        assert_eq!(cache.len(AddressLevel::Country), 1);
        assert_eq!(cache.len(AddressLevel::AreaLevel1), 0);
        assert_eq!(cache.len(AddressLevel::AreaLevel2), 0);
    }

    #[test]
    fn test_populate_skips_when_no_level_derivable() {
        let cache = LevelledCache::new();
        let mut record = city_record();
        record.address_components = vec![component("Some Landmark", &["tourist_attraction"])];
        let response = GeocodeResponse {
            results: vec![record, country_record()],
        };

        let place = populate_from_response(&cache, &response).expect("top record exists");
        assert!(place.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_populate_empty_response_is_none() {
        let cache = LevelledCache::new();
        assert!(populate_from_response(&cache, &GeocodeResponse::default()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_populate_geometric_center_captures_poi_at_city_level() {
        let cache = LevelledCache::new();

        // A point of interest: no administrative tag of its own, geometry is
        // a representative point. Its components still name a country, so
        // the target level exists and population runs.
        let poi = AddressRecord {
            place_id: "poi-1".to_string(),
            formatted_address: "Old Lighthouse".to_string(),
            address_components: vec![
                component("Old Lighthouse", &["point_of_interest"]),
                component("Freedonia", &["country"]),
            ],
            geometry: Geometry {
                bounds: None,
                location: Some(LatLng { lat: 10.0, lng: 20.0 }),
                location_type: LOCATION_TYPE_GEOMETRIC_CENTER.to_string(),
            },
            types: vec!["point_of_interest".to_string()],
        };
        let response = GeocodeResponse {
            results: vec![poi, country_record()],
        };

        let place = populate_from_response(&cache, &response).expect("top record exists");
        assert_eq!(place.country.as_deref(), Some("Freedonia"));

        // The POI lands in the city-level shard even though it carries no
        // administrative tag; the country record is cached normally.
        assert_eq!(cache.len(AddressLevel::Locality), 1);
        assert_eq!(cache.len(AddressLevel::Country), 1);
        let entries = cache.scan(AddressLevel::Locality);
        assert_eq!(entries[0].0, "poi-1");
    }

    #[test]
    fn test_populate_blank_place_ids_never_cached() {
        let cache = LevelledCache::new();
        let mut record = city_record();
        record.place_id = String::new();
        let response = GeocodeResponse {
            results: vec![record],
        };

        let place = populate_from_response(&cache, &response).expect("top record exists");
        assert_eq!(place.city.as_deref(), Some("Springfield"));
        assert!(cache.is_empty());
    }
}
