//! Radius and rectangle predicates over a building snapshot.
//!
//! Both filters scan the whole snapshot. That is fine for catalogs of a few
//! thousand buildings; larger catalogs need a spatial index.

use crate::model::catalog::{Building, BuildingId};
use std::collections::BTreeSet;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two points given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` marginally above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Returns ids of buildings whose distance from the center is `<= radius_km`.
pub fn filter_by_radius(
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
    buildings: &[Building],
) -> BTreeSet<BuildingId> {
    buildings
        .iter()
        .filter(|building| {
            haversine_km(center_lat, center_lon, building.latitude, building.longitude)
                <= radius_km
        })
        .map(|building| building.id)
        .collect()
}

/// Returns ids of buildings inside the rectangle, edges included.
///
/// Ranges are taken as given: `lat_min > lat_max` (or the same for longitude)
/// matches nothing.
pub fn filter_by_rectangle(
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    buildings: &[Building],
) -> BTreeSet<BuildingId> {
    buildings
        .iter()
        .filter(|building| {
            (lat_min..=lat_max).contains(&building.latitude)
                && (lon_min..=lon_max).contains(&building.longitude)
        })
        .map(|building| building.id)
        .collect()
}
