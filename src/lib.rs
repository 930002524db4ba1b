//! Meetpoint - meeting point recommendation for groups traveling together
//!
//! This library turns a set of traveler positions (and optional destinations)
//! into ranked, spatially distinct meeting point recommendations backed by
//! real route costs with estimate fallback.

pub mod api;
pub mod cache;
pub mod candidates;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod geodesy;
pub mod models;
pub mod planner;
pub mod ranking;
pub mod routing;
pub mod scoring;
pub mod web;

// Re-export core types for public API
pub use cache::RouteCache;
pub use candidates::{CandidateSource, ExternalSearchCandidates, GeometricCandidates};
pub use config::MeetpointConfig;
pub use error::MeetpointError;
pub use evaluator::PlanEvaluator;
pub use models::{
    CandidatePoint, Coordinate, Destination, EvaluatedPlan, RankedResult, RouteCost, ScenarioMode,
    Strategy, TransportMode, Traveler,
};
pub use planner::{MeetingPlanner, PlanRequest};
pub use routing::{AmapClient, RouteCostService, RoutingProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, MeetpointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
