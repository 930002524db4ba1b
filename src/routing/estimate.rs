//! Closed-form route cost estimation
//!
//! Used whenever the upstream routing call fails, times out, or returns a
//! structurally invalid response, so scoring is never blocked by a bad lookup.

use crate::geodesy;
use crate::models::{Coordinate, RouteCost, TransportMode};

/// Assumed urban average speed in km/h
#[must_use]
pub fn speed_kmh(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Driving => 40.0,
        TransportMode::Transit => 25.0,
        TransportMode::Walking => 5.0,
        TransportMode::Cycling => 15.0,
    }
}

/// Fixed time cost in minutes: parking, waiting, transfers
#[must_use]
pub fn overhead_min(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Driving => 10.0,
        TransportMode::Transit => 15.0,
        TransportMode::Walking => 0.0,
        TransportMode::Cycling => 5.0,
    }
}

/// Estimate travel time in whole minutes for a given distance and mode
#[must_use]
pub fn estimate_duration_min(distance_km: f64, mode: TransportMode) -> f64 {
    (distance_km / speed_kmh(mode) * 60.0 + overhead_min(mode)).round()
}

/// Build an estimated `RouteCost` from the straight-line distance
#[must_use]
pub fn estimate_cost(origin: Coordinate, destination: Coordinate, mode: TransportMode) -> RouteCost {
    let distance_km = geodesy::distance_km(origin, destination);
    RouteCost {
        duration_min: estimate_duration_min(distance_km, mode),
        distance_km: (distance_km * 10.0).round() / 10.0,
        path: vec![],
        segments: vec![],
        estimated: true,
    }
}
