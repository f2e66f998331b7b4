//! # Location Module
//!
//! Distance math for the store locator.
//!
//! ## Haversine
//! ```text
//!   a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)
//!   c = 2 · atan2(√a, √(1−a))
//!   d = R · c              R = 6371 km, rounded to 2 decimals
//! ```
//!
//! Device permissions and reverse geocoding live in the app shell; this
//! module only sees coordinates.

use std::cmp::Ordering;

use crate::types::{GeoPoint, StoreLocation};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometers, rounded to
/// two decimal places.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    round_2dp(EARTH_RADIUS_KM * c)
}

/// Annotates every store with its distance from `origin` and sorts nearest
/// first.
pub fn sort_by_distance(stores: Vec<StoreLocation>, origin: GeoPoint) -> Vec<StoreLocation> {
    let mut stores = annotate(stores, origin);
    stores.sort_by(by_distance);
    stores
}

/// Like [`sort_by_distance`], keeping only stores within `radius_km`
/// (inclusive). See [`crate::DEFAULT_STORE_RADIUS_KM`].
pub fn filter_by_radius(
    stores: Vec<StoreLocation>,
    origin: GeoPoint,
    radius_km: f64,
) -> Vec<StoreLocation> {
    let mut stores: Vec<_> = annotate(stores, origin)
        .into_iter()
        .filter(|s| s.distance_km.unwrap_or(0.0) <= radius_km)
        .collect();
    stores.sort_by(by_distance);
    stores
}

fn annotate(stores: Vec<StoreLocation>, origin: GeoPoint) -> Vec<StoreLocation> {
    stores
        .into_iter()
        .map(|mut store| {
            store.distance_km = Some(distance_km(origin, store.point()));
            store
        })
        .collect()
}

fn by_distance(a: &StoreLocation, b: &StoreLocation) -> Ordering {
    let da = a.distance_km.unwrap_or(0.0);
    let db = b.distance_km.unwrap_or(0.0);
    da.partial_cmp(&db).unwrap_or(Ordering::Equal)
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_STORE_RADIUS_KM;

    const NYC: GeoPoint = GeoPoint::new(40.7128, -74.0060);

    fn store(id: &str, latitude: f64, longitude: f64) -> StoreLocation {
        StoreLocation {
            id: id.to_string(),
            name: format!("Store {}", id),
            address: String::new(),
            latitude,
            longitude,
            distance_km: None,
            rating: None,
            phone: None,
        }
    }

    #[test]
    fn test_distance_known_values() {
        let la = GeoPoint::new(34.0522, -118.2437);
        assert_eq!(distance_km(NYC, la), 3935.75);
        assert_eq!(distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)), 111.19);
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance_km(NYC, NYC), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let times_square = GeoPoint::new(40.7580, -73.9855);
        assert_eq!(distance_km(NYC, times_square), distance_km(times_square, NYC));
    }

    #[test]
    fn test_sort_by_distance() {
        let stores = vec![
            store("la", 34.0522, -118.2437),
            store("brooklyn", 40.6782, -73.9442),
            store("midtown", 40.7580, -73.9855),
        ];

        let sorted = sort_by_distance(stores, NYC);
        let ids: Vec<_> = sorted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["midtown", "brooklyn", "la"]);
        assert_eq!(sorted[0].distance_km, Some(5.31));
    }

    #[test]
    fn test_filter_by_radius() {
        let stores = vec![
            store("la", 34.0522, -118.2437),
            store("brooklyn", 40.6782, -73.9442),
            store("midtown", 40.7580, -73.9855),
        ];

        let near = filter_by_radius(stores.clone(), NYC, DEFAULT_STORE_RADIUS_KM);
        assert_eq!(near.len(), 2);
        assert!(near.iter().all(|s| s.distance_km.unwrap() <= 10.0));

        let tight = filter_by_radius(stores, NYC, 6.0);
        assert_eq!(tight.len(), 1);
        assert_eq!(tight[0].id, "midtown");
    }
}
