//! Route cost retrieval
//!
//! This module provides route cost resolution for the planning pipeline:
//! - External provider integration (AMap directions and place search)
//! - Closed-form distance/speed estimation used as the universal fallback
//! - A caching, concurrency-bounded service wrapping both

pub mod estimate;
pub mod provider;
pub mod service;

pub use estimate::{estimate_cost, estimate_duration_min};
pub use provider::{AmapClient, PlaceSearch, RoutingProvider};
pub use service::RouteCostService;
