//! Candidate scoring strategies and the destination-aware adjustment

use serde::{Deserialize, Serialize};

use crate::geodesy;
use crate::models::{Coordinate, Strategy};

/// Tunable scoring thresholds.
///
/// Defaults reproduce the production values; they are configuration rather
/// than literals so deployments can adjust them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringTunables {
    /// Detour ratios below this earn a bonus
    pub detour_bonus_threshold: f64,
    /// Detour ratios above this are penalized
    pub detour_penalty_threshold: f64,
    /// Bonus per unit of ratio below the bonus threshold
    pub detour_bonus_scale: f64,
    /// Upper bound on the per-traveler bonus
    pub detour_bonus_cap: f64,
    /// Penalty per unit of ratio above the penalty threshold
    pub detour_penalty_scale: f64,
    /// Flat penalty per kilometer between candidate and destination
    pub distance_penalty_per_km: f64,
}

impl Default for ScoringTunables {
    fn default() -> Self {
        Self {
            detour_bonus_threshold: 1.3,
            detour_penalty_threshold: 1.5,
            detour_bonus_scale: 10.0,
            detour_bonus_cap: 3.0,
            detour_penalty_scale: 5.0,
            distance_penalty_per_km: 2.0,
        }
    }
}

/// Base strategy score over the traveler durations. Higher is better.
#[must_use]
pub fn strategy_score(times: &[f64], strategy: Strategy) -> f64 {
    if times.is_empty() {
        return 0.0;
    }

    let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = times.iter().sum();

    match strategy {
        Strategy::Fair => -max,
        Strategy::Efficient => -sum,
        Strategy::Balanced => -(0.4 * max + 0.3 * sum + 0.3 * population_variance(times) * 10.0),
    }
}

/// Population variance of a duration list
#[must_use]
pub fn population_variance(times: &[f64]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    let mean = times.iter().sum::<f64>() / times.len() as f64;
    times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / times.len() as f64
}

/// Detour-awareness adjustment for one traveler.
///
/// The detour ratio compares the traveler→candidate→destination path against
/// the direct traveler→destination line; 1.0 means the candidate sits exactly
/// on the way.
#[must_use]
pub fn detour_adjustment(
    traveler: Coordinate,
    candidate: Coordinate,
    destination: Coordinate,
    tunables: &ScoringTunables,
) -> f64 {
    let direct = geodesy::distance_km(traveler, destination);
    if direct < 1e-6 {
        // Traveler already at the destination, no meaningful detour ratio
        return 0.0;
    }

    let via_candidate = geodesy::distance_km(traveler, candidate)
        + geodesy::distance_km(candidate, destination);
    let ratio = via_candidate / direct;

    if ratio < tunables.detour_bonus_threshold {
        (tunables.detour_bonus_scale * (tunables.detour_bonus_threshold - ratio))
            .min(tunables.detour_bonus_cap)
    } else if ratio > tunables.detour_penalty_threshold {
        -(tunables.detour_penalty_scale * (ratio - tunables.detour_penalty_threshold))
    } else {
        0.0
    }
}

/// Full candidate score: base strategy score, plus per-traveler detour
/// adjustments and the still-far-from-destination penalty when a destination
/// is present.
///
/// The first destination acts as the representative for the detour terms,
/// matching the single-destination planning mode.
#[must_use]
pub fn score_candidate(
    candidate: Coordinate,
    traveler_coords: &[Coordinate],
    times: &[f64],
    destination: Option<Coordinate>,
    strategy: Strategy,
    tunables: &ScoringTunables,
) -> f64 {
    let base = strategy_score(times, strategy);

    let Some(destination) = destination else {
        return base;
    };

    let adjustments: f64 = traveler_coords
        .iter()
        .map(|t| detour_adjustment(*t, candidate, destination, tunables))
        .sum();

    let distance_penalty =
        tunables.distance_penalty_per_km * geodesy::distance_km(candidate, destination);

    base + adjustments - distance_penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_fair_depends_only_on_max() {
        let base = strategy_score(&[10.0, 20.0, 30.0], Strategy::Fair);
        assert_eq!(base, -30.0);

        // Perturbing a non-max element leaves the score unchanged
        let perturbed = strategy_score(&[5.0, 25.0, 30.0], Strategy::Fair);
        assert_eq!(base, perturbed);
    }

    #[test]
    fn test_efficient_tracks_total() {
        let before = strategy_score(&[10.0, 20.0], Strategy::Efficient);
        let after = strategy_score(&[10.0, 25.0], Strategy::Efficient);
        assert_eq!(before - after, 5.0);
    }

    #[test]
    fn test_balanced_formula() {
        // Equal times: variance zero
        let score = strategy_score(&[12.0, 12.0], Strategy::Balanced);
        assert!((score - -(0.4 * 12.0 + 0.3 * 24.0)).abs() < 1e-9);

        // Spread times: variance of [10, 30] is 100
        let spread = strategy_score(&[10.0, 30.0], Strategy::Balanced);
        assert!((spread - -(0.4 * 30.0 + 0.3 * 40.0 + 0.3 * 100.0 * 10.0)).abs() < 1e-9);
    }

    #[rstest]
    #[case(&[5.0, 5.0], 0.0)]
    #[case(&[10.0, 30.0], 100.0)]
    #[case(&[1.0, 2.0, 3.0], 2.0 / 3.0)]
    fn test_population_variance(#[case] times: &[f64], #[case] expected: f64) {
        assert!((population_variance(times) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_detour_bonus_on_the_way() {
        let tunables = ScoringTunables::default();
        // Candidate exactly on the traveler→destination line: ratio 1.0
        let traveler = Coordinate::new(116.40, 39.90);
        let destination = Coordinate::new(116.50, 39.90);
        let candidate = Coordinate::new(116.45, 39.90);

        let adjustment = detour_adjustment(traveler, candidate, destination, &tunables);
        assert!((adjustment - 3.0).abs() < 1e-6, "expected max bonus, got {adjustment}");
    }

    #[test]
    fn test_detour_penalty_when_doubling_back() {
        let tunables = ScoringTunables::default();
        // Candidate well off the line: ratio around 2.4
        let traveler = Coordinate::new(116.40, 39.90);
        let destination = Coordinate::new(116.50, 39.90);
        let candidate = Coordinate::new(116.40, 39.99);

        let adjustment = detour_adjustment(traveler, candidate, destination, &tunables);
        assert!(adjustment < 0.0, "expected penalty, got {adjustment}");
    }

    #[test]
    fn test_detour_neutral_band() {
        let tunables = ScoringTunables::default();
        let traveler = Coordinate::new(0.0, 0.0);
        let destination = Coordinate::new(1.0, 0.0);
        // Slightly off the line, ratio between 1.3 and 1.5
        let candidate = Coordinate::new(0.5, 0.24);

        let direct = geodesy::distance_km(traveler, destination);
        let via = geodesy::distance_km(traveler, candidate)
            + geodesy::distance_km(candidate, destination);
        let ratio = via / direct;
        assert!(ratio > 1.3 && ratio < 1.5, "test setup drifted, ratio {ratio}");

        assert_eq!(detour_adjustment(traveler, candidate, destination, &tunables), 0.0);
    }

    #[test]
    fn test_score_candidate_applies_distance_penalty() {
        let tunables = ScoringTunables::default();
        let travelers = [Coordinate::new(116.40, 39.90), Coordinate::new(116.44, 39.90)];
        let times = [12.0, 12.0];
        let candidate = Coordinate::new(116.42, 39.90);
        let destination = Coordinate::new(116.48, 39.90);

        let with_destination = score_candidate(
            candidate,
            &travelers,
            &times,
            Some(destination),
            Strategy::Balanced,
            &tunables,
        );
        let without = score_candidate(
            candidate,
            &travelers,
            &times,
            None,
            Strategy::Balanced,
            &tunables,
        );

        let distance = geodesy::distance_km(candidate, destination);
        // Detour adjustments are bounded by the per-traveler cap, so the gap
        // between the two scores is dominated by the distance penalty
        assert!(with_destination < without + 2.0 * tunables.detour_bonus_cap);
        assert!(
            with_destination
                > without - tunables.distance_penalty_per_km * distance
                    - tunables.detour_penalty_scale * distance
        );
    }
}
