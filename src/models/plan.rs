//! Candidate points, evaluated plans, and the ranked result

use serde::{Deserialize, Serialize};

use super::point::{Coordinate, TransportMode};
use super::route::RouteCost;

/// Scoring strategy selecting how traveler times are folded into a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Minimize the worst-case traveler duration
    Fair,
    /// Minimize the total traveler duration
    Efficient,
    /// Blend of worst case, total, and variance
    #[default]
    Balanced,
}

/// One coordinate under consideration as a meeting point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePoint {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    /// Street address when the candidate came from place search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CandidatePoint {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
            address: None,
        }
    }
}

/// Route of one traveler to a candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerRoute {
    pub traveler_id: String,
    pub traveler_name: String,
    pub mode: TransportMode,
    pub cost: RouteCost,
}

/// Route from a candidate to one destination (assumed transit)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRoute {
    pub destination_id: String,
    pub destination_name: String,
    pub cost: RouteCost,
}

/// Aggregate duration statistics over the traveler routes of one plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    /// max - min
    pub duration_spread: f64,
    /// 0.0 when the plan has no destinations
    pub avg_destination_duration: f64,
}

impl PlanStats {
    /// Derive statistics from traveler and destination durations.
    ///
    /// `traveler_durations` must be non-empty by the time a plan is evaluated.
    #[must_use]
    pub fn from_durations(traveler_durations: &[f64], destination_durations: &[f64]) -> Self {
        let count = traveler_durations.len().max(1) as f64;
        let avg = traveler_durations.iter().sum::<f64>() / count;
        let max = traveler_durations
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let min = traveler_durations.iter().copied().fold(f64::INFINITY, f64::min);

        let avg_destination = if destination_durations.is_empty() {
            0.0
        } else {
            destination_durations.iter().sum::<f64>() / destination_durations.len() as f64
        };

        Self {
            avg_duration: avg,
            min_duration: min,
            max_duration: max,
            duration_spread: max - min,
            avg_destination_duration: avg_destination,
        }
    }
}

/// A fully evaluated candidate: routes, statistics, and the scalar score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedPlan {
    pub candidate: CandidatePoint,
    pub routes: Vec<TravelerRoute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination_routes: Vec<DestinationRoute>,
    pub stats: PlanStats,
    pub score: f64,
}

impl EvaluatedPlan {
    /// Traveler durations in route order
    #[must_use]
    pub fn traveler_durations(&self) -> Vec<f64> {
        self.routes.iter().map(|r| r.cost.duration_min).collect()
    }
}

/// Final output of one planning request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub best_plan: EvaluatedPlan,
    pub alternatives: Vec<EvaluatedPlan>,
    pub search_center: Coordinate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_stats() {
        let stats = PlanStats::from_durations(&[10.0, 20.0, 30.0], &[]);
        assert_eq!(stats.avg_duration, 20.0);
        assert_eq!(stats.min_duration, 10.0);
        assert_eq!(stats.max_duration, 30.0);
        assert_eq!(stats.duration_spread, 20.0);
        assert_eq!(stats.avg_destination_duration, 0.0);
    }

    #[test]
    fn test_plan_stats_invariant() {
        let stats = PlanStats::from_durations(&[12.0, 12.0], &[15.0, 25.0]);
        assert!(stats.max_duration >= stats.avg_duration);
        assert!(stats.avg_duration >= stats.min_duration);
        assert_eq!(stats.duration_spread, stats.max_duration - stats.min_duration);
        assert_eq!(stats.avg_destination_duration, 20.0);
    }

    #[test]
    fn test_strategy_default() {
        assert_eq!(Strategy::default(), Strategy::Balanced);
        let parsed: Strategy = serde_json::from_str("\"fair\"").unwrap();
        assert_eq!(parsed, Strategy::Fair);
    }
}
