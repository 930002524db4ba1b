//! Candidate meeting point generation
//!
//! Two interchangeable sources produce the `CandidatePoint` list the
//! evaluator consumes: pure geometric synthesis around the weighted centroid,
//! and external place search seeded at the destination-biased search center.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::Result;
use crate::config::MeetpointConfig;
use crate::geodesy;
use crate::models::{CandidatePoint, Coordinate, Destination, Traveler};
use crate::routing::PlaceSearch;

/// Grid offsets around the weighted centroid, ~0.5-1.1 km at mid-latitudes
const GRID_OFFSETS: [(f64, f64); 8] = [
    (0.01, 0.0),
    (-0.01, 0.0),
    (0.0, 0.01),
    (0.0, -0.01),
    (0.007, 0.007),
    (-0.007, 0.007),
    (0.007, -0.007),
    (-0.007, -0.007),
];

/// Interpolation ratios between the weighted centroid and each destination
const DESTINATION_RATIOS: [f64; 3] = [0.3, 0.5, 0.7];

/// Interpolation ratio from the weighted centroid toward each traveler
const TRAVELER_RATIO: f64 = 0.3;

/// Produces the ordered candidate list for one planning request.
///
/// Order is significant: the planner truncates the list before route
/// evaluation, so earlier candidates are the more promising ones.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(
        &self,
        travelers: &[Traveler],
        destinations: &[Destination],
    ) -> Result<Vec<CandidatePoint>>;
}

/// Geometric candidate synthesis around the weighted centroid
pub struct GeometricCandidates {
    fallback_center: Coordinate,
    destination_weight: f64,
}

impl GeometricCandidates {
    #[must_use]
    pub fn new(fallback_center: Coordinate, destination_weight: f64) -> Self {
        Self {
            fallback_center,
            destination_weight,
        }
    }

    fn generate(&self, travelers: &[Traveler], destinations: &[Destination]) -> Vec<CandidatePoint> {
        if travelers.is_empty() {
            return vec![];
        }

        let traveler_coords: Vec<Coordinate> = travelers.iter().map(|t| t.coordinate).collect();
        let traveler_centroid = geodesy::centroid(&traveler_coords, self.fallback_center);

        let weighted = if destinations.is_empty() {
            traveler_centroid
        } else {
            let weighted_points: Vec<(Coordinate, f64)> = traveler_coords
                .iter()
                .map(|c| (*c, 1.0))
                .chain(destinations.iter().map(|d| (d.coordinate, self.destination_weight)))
                .collect();
            geodesy::weighted_centroid(&weighted_points, self.fallback_center)
        };

        let mut points = vec![weighted];

        if !destinations.is_empty() {
            points.push(traveler_centroid);
        }

        for destination in destinations {
            for ratio in DESTINATION_RATIOS {
                points.push(geodesy::interpolate(weighted, destination.coordinate, ratio));
            }
        }

        for coord in &traveler_coords {
            points.push(geodesy::interpolate(weighted, *coord, TRAVELER_RATIO));
        }

        for (dlng, dlat) in GRID_OFFSETS {
            points.push(Coordinate::new(weighted.lng + dlng, weighted.lat + dlat));
        }

        points
            .into_iter()
            .enumerate()
            .map(|(index, coordinate)| {
                CandidatePoint::new(
                    format!("candidate-{index}"),
                    format!("Meeting point {}", index + 1),
                    coordinate,
                )
            })
            .collect()
    }
}

#[async_trait]
impl CandidateSource for GeometricCandidates {
    async fn candidates(
        &self,
        travelers: &[Traveler],
        destinations: &[Destination],
    ) -> Result<Vec<CandidatePoint>> {
        let candidates = self.generate(travelers, destinations);
        debug!("generated {} geometric candidates", candidates.len());
        Ok(candidates)
    }
}

/// Candidates from external place search around the search center
pub struct ExternalSearchCandidates {
    search: Arc<dyn PlaceSearch>,
    radius_m: u32,
    poi_types: String,
    fallback_center: Coordinate,
}

impl ExternalSearchCandidates {
    #[must_use]
    pub fn new(
        search: Arc<dyn PlaceSearch>,
        radius_m: u32,
        poi_types: String,
        fallback_center: Coordinate,
    ) -> Self {
        Self {
            search,
            radius_m,
            poi_types,
            fallback_center,
        }
    }
}

#[async_trait]
impl CandidateSource for ExternalSearchCandidates {
    async fn candidates(
        &self,
        travelers: &[Traveler],
        destinations: &[Destination],
    ) -> Result<Vec<CandidatePoint>> {
        let traveler_coords: Vec<Coordinate> = travelers.iter().map(|t| t.coordinate).collect();
        let center = search_center(
            &traveler_coords,
            destinations.first().map(|d| d.coordinate),
            self.fallback_center,
        );

        self.search
            .search_around(center, self.radius_m, &self.poi_types)
            .await
    }
}

/// Build the configured candidate source.
///
/// POI search cannot work without an API key; in that case the geometric
/// source is used instead so the service still answers.
#[must_use]
pub fn source_from_config(
    config: &MeetpointConfig,
    search: Arc<dyn PlaceSearch>,
) -> Arc<dyn CandidateSource> {
    let planner = &config.planner;
    if planner.candidate_source == "poi" {
        if config.routing.api_key.is_some() {
            return Arc::new(ExternalSearchCandidates::new(
                search,
                planner.search_radius_m,
                planner.poi_types.clone(),
                planner.fallback_center(),
            ));
        }
        warn!("POI candidate source configured without an API key, using geometric synthesis");
    }
    Arc::new(GeometricCandidates::new(
        planner.fallback_center(),
        planner.destination_weight,
    ))
}

/// Center of the candidate search area.
///
/// With a destination the center is pulled 30% of the way from the traveler
/// centroid toward it, so place search favors points on the way.
#[must_use]
pub fn search_center(
    traveler_coords: &[Coordinate],
    destination: Option<Coordinate>,
    fallback: Coordinate,
) -> Coordinate {
    let center = geodesy::centroid(traveler_coords, fallback);
    match destination {
        Some(dest) => Coordinate::new(
            center.lng * 0.7 + dest.lng * 0.3,
            center.lat * 0.7 + dest.lat * 0.3,
        ),
        None => center,
    }
}
