//! Great-circle distance and centroid arithmetic over coordinates

use crate::models::Coordinate;

/// Great-circle distance between two coordinates in kilometers
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.lat,
            longitude: a.lng,
        },
        haversine::Location {
            latitude: b.lat,
            longitude: b.lng,
        },
        haversine::Units::Kilometers,
    )
}

/// Arithmetic mean position of a set of coordinates.
///
/// Returns `fallback` for an empty slice; the caller supplies the policy
/// default (configured city center) rather than this module hiding one.
#[must_use]
pub fn centroid(points: &[Coordinate], fallback: Coordinate) -> Coordinate {
    if points.is_empty() {
        return fallback;
    }

    let count = points.len() as f64;
    let sum_lng: f64 = points.iter().map(|p| p.lng).sum();
    let sum_lat: f64 = points.iter().map(|p| p.lat).sum();

    Coordinate::new(sum_lng / count, sum_lat / count)
}

/// Weighted arithmetic mean of coordinates
#[must_use]
pub fn weighted_centroid(points: &[(Coordinate, f64)], fallback: Coordinate) -> Coordinate {
    let total_weight: f64 = points.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return fallback;
    }

    let sum_lng: f64 = points.iter().map(|(p, w)| p.lng * w).sum();
    let sum_lat: f64 = points.iter().map(|(p, w)| p.lat * w).sum();

    Coordinate::new(sum_lng / total_weight, sum_lat / total_weight)
}

/// Point at `ratio` along the straight line from `from` to `to` in degree space
#[must_use]
pub fn interpolate(from: Coordinate, to: Coordinate, ratio: f64) -> Coordinate {
    Coordinate::new(
        from.lng + (to.lng - from.lng) * ratio,
        from.lat + (to.lat - from.lat) * ratio,
    )
}
