//! Geographic points and the participants of one planning request

use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in decimal degrees
    pub lng: f64,
    /// Latitude in decimal degrees
    pub lat: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Both components finite and within the valid degree ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (i64, i64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lng = (self.lng * multiplier).round() as i64;
        let lat = (self.lat * multiplier).round() as i64;
        (lng, lat)
    }

    /// Format coordinate as a display string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.6},{:.6}", self.lng, self.lat)
    }
}

/// Transport mode for the leg from a traveler to the meeting point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Driving,
    Transit,
    Walking,
    Cycling,
}

impl TransportMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Driving => "driving",
            TransportMode::Transit => "transit",
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
        }
    }
}

/// One traveler heading to the meeting point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub mode: TransportMode,
}

/// Shared destination the group continues to after meeting up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
}

/// Planning scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioMode {
    /// Plain meetup, no shared destination
    #[default]
    Meetup,
    /// The group continues to a shared destination after meeting
    Destination,
}
