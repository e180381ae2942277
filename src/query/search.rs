//! Search execution and GeoJSON-like result formatting.

use anyhow::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use zipradius::{HasCoordinates, Location, Nearby, Unit, Zip, ZipStore};

/// Search parameters
pub struct SearchParams {
    pub radius: f64,
    pub unit: Unit,
    pub max_results: usize,
}

/// Search result in GeoJSON-like format
#[derive(Debug, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub result_type: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct Properties {
    pub code: String,
    pub city: String,
    pub state: String,
    pub state_name: String,
    pub distance: f64,
    pub unit: &'static str,
}

impl SearchResult {
    fn from_nearby(nearby: Nearby<Zip>, unit: Unit) -> Self {
        let location = nearby.record.location();
        Self {
            result_type: "Feature".to_string(),
            geometry: Geometry {
                geo_type: "Point".to_string(),
                coordinates: [location.longitude, location.latitude],
            },
            properties: Properties {
                code: nearby.record.code,
                city: nearby.record.city,
                state: nearby.record.state.code().to_string(),
                state_name: nearby.record.state.name().to_string(),
                distance: nearby.distance,
                unit: unit.suffix(),
            },
        }
    }
}

/// Results with timing
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Location>,
    pub radius: f64,
    pub unit: Unit,
    pub features: Vec<SearchResult>,
    pub took_ms: u128,
}

/// Search around a ZIP code; an unknown code gives an empty feature list
pub fn execute_zip_search(
    store: &ZipStore,
    code: &str,
    params: &SearchParams,
) -> Result<SearchResponse> {
    let start = Instant::now();

    let results = store.manager().radius_search_by_zip(
        code,
        params.radius,
        params.unit,
        Some(params.max_results),
    )?;
    let origin = store.get_by_code(code)?.map(|z| z.location());

    debug!("Zip search for {} returned {} results", code, results.len());
    Ok(respond(origin, params, results, start))
}

/// Search around an explicit point
pub fn execute_point_search(
    store: &ZipStore,
    origin: Location,
    params: &SearchParams,
) -> Result<SearchResponse> {
    let start = Instant::now();

    let results = store
        .manager()
        .nearby_locations(origin, params.radius)
        .unit(params.unit)
        .max_results(params.max_results)
        .order_by_distance()
        .fetch()?;

    debug!("Point search returned {} results", results.len());
    Ok(respond(Some(origin), params, results, start))
}

fn respond(
    origin: Option<Location>,
    params: &SearchParams,
    results: Vec<Nearby<Zip>>,
    start: Instant,
) -> SearchResponse {
    SearchResponse {
        origin,
        radius: params.radius,
        unit: params.unit,
        features: results
            .into_iter()
            .map(|n| SearchResult::from_nearby(n, params.unit))
            .collect(),
        took_ms: start.elapsed().as_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipradius::UsState;

    fn store() -> ZipStore {
        let store = ZipStore::open_in_memory().unwrap();
        for (code, city, state, lon, lat) in [
            ("60601", "Chicago", UsState::Illinois, -87.6223, 41.8858),
            ("60201", "Evanston", UsState::Illinois, -87.6936, 42.0451),
            ("53202", "Milwaukee", UsState::Wisconsin, -87.8982, 43.0464),
        ] {
            let zip = Zip::new(code, city, state, Location::new(lon, lat)).unwrap();
            store.insert(&zip).unwrap();
        }
        store
    }

    fn params(radius: f64) -> SearchParams {
        SearchParams {
            radius,
            unit: Unit::Imperial,
            max_results: 10,
        }
    }

    #[test]
    fn test_zip_search_features() {
        let response = execute_zip_search(&store(), "60601", &params(15.0)).unwrap();
        let codes: Vec<&str> = response
            .features
            .iter()
            .map(|f| f.properties.code.as_str())
            .collect();
        assert_eq!(codes, vec!["60601", "60201"]);
        assert_eq!(response.features[0].geometry.coordinates, [-87.6223, 41.8858]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["unit"], "imperial");
        assert_eq!(json["features"][1]["properties"]["unit"], "mi");
    }

    #[test]
    fn test_unknown_zip_is_empty() {
        let response = execute_zip_search(&store(), "00000", &params(15.0)).unwrap();
        assert!(response.origin.is_none());
        assert!(response.features.is_empty());
    }

    #[test]
    fn test_zip_search_respects_cap() {
        let mut p = params(500.0);
        p.max_results = 2;
        let response = execute_zip_search(&store(), "53202", &p).unwrap();
        let codes: Vec<&str> = response
            .features
            .iter()
            .map(|f| f.properties.code.as_str())
            .collect();
        assert_eq!(codes, vec!["53202", "60201"]);

        p.max_results = 0;
        let response = execute_zip_search(&store(), "53202", &p).unwrap();
        assert!(response.features.is_empty());
        assert_eq!(response.origin, Some(Location::new(-87.8982, 43.0464)));
    }

    #[test]
    fn test_point_search_respects_cap() {
        let mut p = params(500.0);
        p.max_results = 1;
        let response =
            execute_point_search(&store(), Location::new(-87.9, 43.0), &p).unwrap();
        assert_eq!(response.features.len(), 1);
        assert_eq!(response.features[0].properties.code, "53202");
    }
}
