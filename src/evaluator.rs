//! Per-candidate plan evaluation

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::models::{
    CandidatePoint, Destination, DestinationRoute, EvaluatedPlan, PlanStats, TransportMode,
    Traveler, TravelerRoute,
};
use crate::routing::RouteCostService;

/// Resolves the full route picture for one candidate.
///
/// Traveler legs use each traveler's own transport mode; destination legs are
/// always resolved as transit, the mode people use for the onward group trip.
pub struct PlanEvaluator {
    service: Arc<RouteCostService>,
}

impl PlanEvaluator {
    #[must_use]
    pub fn new(service: Arc<RouteCostService>) -> Self {
        Self { service }
    }

    /// Evaluate one candidate against all travelers and destinations.
    ///
    /// The returned plan carries a zero score; scoring happens separately so
    /// one evaluation can be re-scored under different strategies.
    pub async fn evaluate(
        &self,
        candidate: &CandidatePoint,
        travelers: &[Traveler],
        destinations: &[Destination],
        city: Option<&str>,
    ) -> EvaluatedPlan {
        let origins: Vec<_> = travelers
            .iter()
            .map(|t| (t.id.clone(), t.coordinate, t.mode))
            .collect();
        let costs = self
            .service
            .batch(&origins, candidate.coordinate, city)
            .await;

        // batch resolves every id it was given, so the lookup cannot miss
        let routes: Vec<TravelerRoute> = travelers
            .iter()
            .filter_map(|t| {
                costs.get(&t.id).map(|cost| TravelerRoute {
                    traveler_id: t.id.clone(),
                    traveler_name: t.name.clone(),
                    mode: t.mode,
                    cost: cost.clone(),
                })
            })
            .collect();

        let destination_lookups = destinations.iter().map(|d| async move {
            let cost = self
                .service
                .cost(candidate.coordinate, d.coordinate, TransportMode::Transit, city)
                .await;
            DestinationRoute {
                destination_id: d.id.clone(),
                destination_name: d.name.clone(),
                cost,
            }
        });
        let destination_routes: Vec<DestinationRoute> = join_all(destination_lookups).await;

        let traveler_durations: Vec<f64> = routes.iter().map(|r| r.cost.duration_min).collect();
        let destination_durations: Vec<f64> = destination_routes
            .iter()
            .map(|r| r.cost.duration_min)
            .collect();
        let stats = PlanStats::from_durations(&traveler_durations, &destination_durations);

        debug!(
            candidate = %candidate.id,
            max_duration = stats.max_duration,
            "evaluated candidate"
        );

        EvaluatedPlan {
            candidate: candidate.clone(),
            routes,
            destination_routes,
            stats,
            score: 0.0,
        }
    }
}
