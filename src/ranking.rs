//! Score-ordered, diversity-constrained plan selection

use tracing::debug;

use crate::geodesy;
use crate::models::EvaluatedPlan;

/// Order plans by score and keep the top ones that are spatially distinct.
///
/// Selection is greedy over the score order: a plan is accepted only when its
/// candidate sits more than `min_separation_km` from every already accepted
/// candidate. The sort is stable, so equal scores keep their evaluation order.
#[must_use]
pub fn rank(
    mut plans: Vec<EvaluatedPlan>,
    top_k: usize,
    min_separation_km: f64,
) -> Vec<EvaluatedPlan> {
    plans.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected: Vec<EvaluatedPlan> = Vec::with_capacity(top_k);
    for plan in plans {
        if selected.len() >= top_k {
            break;
        }
        let distinct = selected.iter().all(|kept| {
            geodesy::distance_km(kept.candidate.coordinate, plan.candidate.coordinate)
                > min_separation_km
        });
        if distinct {
            selected.push(plan);
        }
    }

    debug!(selected = selected.len(), "ranked plans");
    selected
}
