//! Planning pipeline: validate, generate, evaluate, score, rank

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::Result;
use crate::candidates::{self, CandidateSource};
use crate::config::MeetpointConfig;
use crate::error::MeetpointError;
use crate::evaluator::PlanEvaluator;
use crate::models::{
    Coordinate, Destination, RankedResult, ScenarioMode, Strategy, Traveler,
};
use crate::ranking;
use crate::scoring::{self, ScoringTunables};

/// One planning request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub travelers: Vec<Traveler>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub scenario: ScenarioMode,
    /// City hint forwarded to transit routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Runs the full planning pipeline for one request.
pub struct MeetingPlanner {
    source: Arc<dyn CandidateSource>,
    evaluator: PlanEvaluator,
    fallback_center: Coordinate,
    max_candidates: usize,
    top_k: usize,
    min_separation_km: f64,
    tunables: ScoringTunables,
}

impl MeetingPlanner {
    #[must_use]
    pub fn new(
        source: Arc<dyn CandidateSource>,
        evaluator: PlanEvaluator,
        config: &MeetpointConfig,
    ) -> Self {
        Self {
            source,
            evaluator,
            fallback_center: config.planner.fallback_center(),
            max_candidates: config.planner.max_candidates as usize,
            top_k: config.planner.top_k as usize,
            min_separation_km: f64::from(config.planner.min_separation_m) / 1000.0,
            tunables: config.planner.scoring_tunables(),
        }
    }

    /// Produce the ranked meeting point recommendation for one request.
    #[instrument(level = "info", skip_all, fields(travelers = request.travelers.len()))]
    pub async fn plan(&self, request: &PlanRequest) -> Result<RankedResult> {
        let travelers = self.validated_travelers(request)?;
        let destinations: Vec<Destination> = request
            .destinations
            .iter()
            .filter(|d| d.coordinate.is_valid())
            .cloned()
            .collect();

        if request.scenario == ScenarioMode::Destination && destinations.is_empty() {
            return Err(MeetpointError::validation(
                "Destination planning requires at least one destination with valid coordinates",
            ));
        }

        let mut candidates = self.source.candidates(&travelers, &destinations).await?;
        candidates.truncate(self.max_candidates);
        if candidates.is_empty() {
            return Err(MeetpointError::no_candidates(
                "Candidate generation produced no points",
            ));
        }

        let city = request.city.as_deref();
        let evaluations = candidates.iter().map(|candidate| {
            self.evaluator
                .evaluate(candidate, &travelers, &destinations, city)
        });
        let mut plans = join_all(evaluations).await;

        let traveler_coords: Vec<Coordinate> = travelers.iter().map(|t| t.coordinate).collect();
        let destination_coord = destinations.first().map(|d| d.coordinate);
        for plan in &mut plans {
            plan.score = scoring::score_candidate(
                plan.candidate.coordinate,
                &traveler_coords,
                &plan.traveler_durations(),
                destination_coord,
                request.strategy,
                &self.tunables,
            );
        }

        let mut ranked = ranking::rank(plans, self.top_k, self.min_separation_km);
        if ranked.is_empty() {
            return Err(MeetpointError::no_candidates(
                "No candidate survived ranking",
            ));
        }
        let best_plan = ranked.remove(0);

        info!(
            best = %best_plan.candidate.id,
            score = best_plan.score,
            alternatives = ranked.len(),
            "planning complete"
        );

        Ok(RankedResult {
            best_plan,
            alternatives: ranked,
            search_center: candidates::search_center(
                &traveler_coords,
                destination_coord,
                self.fallback_center,
            ),
        })
    }

    fn validated_travelers(&self, request: &PlanRequest) -> Result<Vec<Traveler>> {
        let travelers: Vec<Traveler> = request
            .travelers
            .iter()
            .filter(|t| {
                let valid = t.coordinate.is_valid();
                if !valid {
                    warn!(traveler = %t.id, "dropping traveler with invalid coordinates");
                }
                valid
            })
            .cloned()
            .collect();

        if travelers.len() < 2 {
            return Err(MeetpointError::validation(
                "At least two travelers with valid coordinates are required",
            ));
        }

        Ok(travelers)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::cache::RouteCache;
    use crate::candidates::GeometricCandidates;
    use crate::models::{RouteCost, TransportMode};
    use crate::routing::provider::RoutingProvider;
    use crate::routing::RouteCostService;

    struct DownProvider;

    #[async_trait]
    impl RoutingProvider for DownProvider {
        async fn route(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
            _mode: TransportMode,
            _city: Option<&str>,
        ) -> Result<RouteCost> {
            Err(MeetpointError::provider("offline"))
        }
    }

    fn planner() -> MeetingPlanner {
        let config = MeetpointConfig::default();
        let service = Arc::new(RouteCostService::new(
            Arc::new(DownProvider),
            Arc::new(RouteCache::new(Duration::from_secs(60), 256)),
            4,
            Duration::from_secs(2),
        ));
        let source = Arc::new(GeometricCandidates::new(
            config.planner.fallback_center(),
            config.planner.destination_weight,
        ));
        MeetingPlanner::new(source, PlanEvaluator::new(service), &config)
    }

    fn traveler(id: &str, lng: f64, lat: f64) -> Traveler {
        Traveler {
            id: id.to_string(),
            name: id.to_uppercase(),
            coordinate: Coordinate::new(lng, lat),
            mode: TransportMode::Driving,
        }
    }

    #[tokio::test]
    async fn test_plan_requires_two_valid_travelers() {
        let planner = planner();
        let request = PlanRequest {
            travelers: vec![
                traveler("a", 116.42, 39.90),
                traveler("bad", 200.0, 39.90),
            ],
            destinations: vec![],
            strategy: Strategy::Balanced,
            scenario: ScenarioMode::Meetup,
            city: None,
        };

        let err = planner.plan(&request).await.unwrap_err();
        assert!(matches!(err, MeetpointError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_destination_scenario_requires_destination() {
        let planner = planner();
        let request = PlanRequest {
            travelers: vec![traveler("a", 116.42, 39.90), traveler("b", 116.46, 39.91)],
            destinations: vec![],
            strategy: Strategy::Balanced,
            scenario: ScenarioMode::Destination,
            city: None,
        };

        let err = planner.plan(&request).await.unwrap_err();
        assert!(matches!(err, MeetpointError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_plan_caps_candidates_and_ranks() {
        let planner = planner();
        let request = PlanRequest {
            travelers: vec![
                traveler("a", 116.427_115, 39.903_536),
                traveler("b", 116.459_819, 39.909_652),
            ],
            destinations: vec![],
            strategy: Strategy::Balanced,
            scenario: ScenarioMode::Meetup,
            city: None,
        };

        let result = planner.plan(&request).await.unwrap();

        // Centroid candidate wins with symmetric 12 minute drives
        assert_eq!(result.best_plan.stats.max_duration, 12.0);
        assert_eq!(result.best_plan.stats.duration_spread, 0.0);
        assert!(result.alternatives.len() <= 2);
        // Search center equals the traveler centroid without a destination
        assert!((result.search_center.lng - 116.443_467).abs() < 1e-6);
    }
}
