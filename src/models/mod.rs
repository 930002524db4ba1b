//! Core data model for the meetpoint engine
//!
//! All entities here are request-scoped value objects; nothing outlives one
//! planning call except the route cache.

pub mod plan;
pub mod point;
pub mod route;

pub use plan::{
    CandidatePoint, DestinationRoute, EvaluatedPlan, PlanStats, RankedResult, Strategy,
    TravelerRoute,
};
pub use point::{Coordinate, Destination, ScenarioMode, TransportMode, Traveler};
pub use route::{RouteCost, SegmentKind, TransitSegment};
