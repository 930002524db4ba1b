//! Route cost data returned by the routing layer

use serde::{Deserialize, Serialize};

use super::point::Coordinate;

/// Cost of traveling between two points under one transport mode.
///
/// Produced once per (origin, destination, mode) lookup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCost {
    /// Travel time in minutes
    pub duration_min: f64,
    /// Travel distance in kilometers
    pub distance_km: f64,
    /// Route geometry, empty when unavailable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Coordinate>,
    /// Ordered transit legs, empty for non-transit routes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<TransitSegment>,
    /// True when this cost came from the closed-form estimate instead of the provider
    #[serde(default)]
    pub estimated: bool,
}

impl RouteCost {
    /// Duration and distance are usable for scoring
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.duration_min.is_finite()
            && self.duration_min >= 0.0
            && self.distance_km.is_finite()
            && self.distance_km >= 0.0
    }
}

/// Kind of one leg in a transit plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Walk,
    Bus,
    Subway,
    Railway,
    Taxi,
}

/// One ordered leg of a transit route, kept for display only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitSegment {
    pub kind: SegmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_station: Option<String>,
    /// Leg duration in minutes
    pub duration_min: f64,
    /// Leg distance in meters
    pub distance_m: f64,
}
