// Shared test helpers for building geocode responses and manifests.
//
// This module provides common utilities used across multiple test files to
// reduce duplication.

#![allow(dead_code)] // Each integration test binary uses a subset

use photo_places::geocode::types::{
    AddressComponent, AddressRecord, Bounds, GeocodeResponse, Geometry, LatLng,
};

/// Builds an address component carrying the given type tags.
pub fn component(long_name: &str, types: &[&str]) -> AddressComponent {
    AddressComponent {
        long_name: long_name.to_string(),
        short_name: long_name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

/// Builds a bounded record tagged with the given record-level types.
pub fn bounded_record(
    place_id: &str,
    formatted_address: &str,
    components: Vec<AddressComponent>,
    types: &[&str],
    ne: (f64, f64),
    sw: (f64, f64),
) -> AddressRecord {
    AddressRecord {
        place_id: place_id.to_string(),
        formatted_address: formatted_address.to_string(),
        address_components: components,
        geometry: Geometry {
            bounds: Some(Bounds {
                northeast: LatLng { lat: ne.0, lng: ne.1 },
                southwest: LatLng { lat: sw.0, lng: sw.1 },
            }),
            location: None,
            location_type: "APPROXIMATE".to_string(),
        },
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

/// A response whose top record is the city of Springfield, Freedonia, with
/// the country record following. Covers the coordinate (10.0, 20.0).
pub fn springfield_response() -> GeocodeResponse {
    GeocodeResponse {
        results: vec![
            bounded_record(
                "city-springfield",
                "Springfield, Freedonia",
                vec![
                    component("Springfield", &["locality", "political"]),
                    component("Freedonia", &["country", "political"]),
                ],
                &["locality", "political"],
                (10.01, 20.01),
                (9.99, 19.99),
            ),
            bounded_record(
                "country-freedonia",
                "Freedonia",
                vec![component("Freedonia", &["country", "political"])],
                &["country", "political"],
                (15.0, 25.0),
                (5.0, 15.0),
            ),
        ],
    }
}

/// A response holding only the Freedonia country record.
pub fn country_only_response() -> GeocodeResponse {
    GeocodeResponse {
        results: vec![bounded_record(
            "country-freedonia",
            "Freedonia",
            vec![component("Freedonia", &["country", "political"])],
            &["country", "political"],
            (15.0, 25.0),
            (5.0, 15.0),
        )],
    }
}

/// The Springfield response as a JSON body for mock servers.
pub fn springfield_body() -> String {
    serde_json::to_string(&springfield_response()).expect("response should serialize")
}
