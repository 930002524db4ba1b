//! Configuration management for the meetpoint service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::MeetpointError;
use crate::models::Coordinate;
use crate::scoring::ScoringTunables;

/// Root configuration structure for the meetpoint service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MeetpointConfig {
    /// Routing provider configuration
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Route cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Planning pipeline settings
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Routing provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// AMap web service API key; without it every lookup uses estimates
    pub api_key: Option<String>,
    /// Base URL for the routing API
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,
    /// Per-lookup timeout in seconds
    #[serde(default = "default_routing_timeout")]
    pub timeout_seconds: u32,
    /// Concurrent lookup limit
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: u32,
}

/// Route cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Maximum number of cached routes
    #[serde(default = "default_cache_entries")]
    pub max_entries: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Planning pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Fallback center longitude when no traveler has valid coordinates
    #[serde(default = "default_center_lng")]
    pub fallback_center_lng: f64,
    /// Fallback center latitude
    #[serde(default = "default_center_lat")]
    pub fallback_center_lat: f64,
    /// Weight of each destination in the weighted centroid
    #[serde(default = "default_destination_weight")]
    pub destination_weight: f64,
    /// Maximum candidates evaluated per request
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u32,
    /// Number of plans returned (best plus alternatives)
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Minimum separation between returned candidates, meters
    #[serde(default = "default_min_separation")]
    pub min_separation_m: u32,
    /// Candidate source: "geometric" synthesis or "poi" place search
    #[serde(default = "default_candidate_source")]
    pub candidate_source: String,
    /// Place search radius around the search center, meters
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,
    /// POI category codes passed to place search
    #[serde(default = "default_poi_types")]
    pub poi_types: String,
    /// Detour ratio below which on-the-way candidates earn a bonus
    #[serde(default = "default_detour_bonus_threshold")]
    pub detour_bonus_threshold: f64,
    /// Detour ratio above which candidates are penalized
    #[serde(default = "default_detour_penalty_threshold")]
    pub detour_penalty_threshold: f64,
}

// Default value functions
fn default_routing_base_url() -> String {
    "https://restapi.amap.com".to_string()
}

fn default_routing_timeout() -> u32 {
    8
}

fn default_max_concurrent() -> u32 {
    8
}

fn default_cache_ttl() -> u32 {
    10
}

fn default_cache_entries() -> u32 {
    1024
}

fn default_port() -> u16 {
    8080
}

fn default_center_lng() -> f64 {
    116.397_428
}

fn default_center_lat() -> f64 {
    39.909_23
}

fn default_destination_weight() -> f64 {
    2.0
}

fn default_max_candidates() -> u32 {
    8
}

fn default_top_k() -> u32 {
    3
}

fn default_min_separation() -> u32 {
    500
}

fn default_candidate_source() -> String {
    "geometric".to_string()
}

fn default_search_radius() -> u32 {
    2000
}

// Catering, shopping, and life-service POI categories
fn default_poi_types() -> String {
    "050000|060000|070000".to_string()
}

fn default_detour_bonus_threshold() -> f64 {
    1.3
}

fn default_detour_penalty_threshold() -> f64 {
    1.5
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_routing_base_url(),
            timeout_seconds: default_routing_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cache_ttl(),
            max_entries: default_cache_entries(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fallback_center_lng: default_center_lng(),
            fallback_center_lat: default_center_lat(),
            destination_weight: default_destination_weight(),
            max_candidates: default_max_candidates(),
            top_k: default_top_k(),
            min_separation_m: default_min_separation(),
            candidate_source: default_candidate_source(),
            search_radius_m: default_search_radius(),
            poi_types: default_poi_types(),
            detour_bonus_threshold: default_detour_bonus_threshold(),
            detour_penalty_threshold: default_detour_penalty_threshold(),
        }
    }
}

impl PlannerConfig {
    /// Fallback center as a coordinate
    #[must_use]
    pub fn fallback_center(&self) -> Coordinate {
        Coordinate::new(self.fallback_center_lng, self.fallback_center_lat)
    }

    /// Scoring thresholds derived from this configuration
    #[must_use]
    pub fn scoring_tunables(&self) -> ScoringTunables {
        ScoringTunables {
            detour_bonus_threshold: self.detour_bonus_threshold,
            detour_penalty_threshold: self.detour_penalty_threshold,
            ..ScoringTunables::default()
        }
    }
}

impl MeetpointConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with MEETPOINT_ prefix
        builder = builder.add_source(
            Environment::with_prefix("MEETPOINT")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: MeetpointConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("meetpoint").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if let Some(api_key) = &self.routing.api_key {
            if api_key.is_empty() {
                return Err(MeetpointError::config(
                    "Routing API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        if !self.routing.base_url.starts_with("http://")
            && !self.routing.base_url.starts_with("https://")
        {
            return Err(
                MeetpointError::config("Routing base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        if self.routing.timeout_seconds == 0 || self.routing.timeout_seconds > 60 {
            return Err(
                MeetpointError::config("Routing timeout must be between 1 and 60 seconds").into(),
            );
        }

        if self.routing.max_concurrent_requests == 0 {
            return Err(
                MeetpointError::config("Concurrent request limit must be at least 1").into(),
            );
        }

        if self.cache.ttl_minutes == 0 || self.cache.ttl_minutes > 1440 {
            return Err(
                MeetpointError::config("Cache TTL must be between 1 and 1440 minutes").into(),
            );
        }

        if self.cache.max_entries == 0 {
            return Err(MeetpointError::config("Cache capacity must be at least 1").into());
        }

        if !self.planner.fallback_center().is_valid() {
            return Err(MeetpointError::config("Fallback center is not a valid coordinate").into());
        }

        if self.planner.destination_weight <= 0.0 {
            return Err(MeetpointError::config("Destination weight must be positive").into());
        }

        if self.planner.max_candidates == 0 || self.planner.top_k == 0 {
            return Err(
                MeetpointError::config("Candidate cap and top-K must be at least 1").into(),
            );
        }

        let valid_sources = ["geometric", "poi"];
        if !valid_sources.contains(&self.planner.candidate_source.as_str()) {
            return Err(MeetpointError::config(format!(
                "Invalid candidate source '{}'. Must be one of: {}",
                self.planner.candidate_source,
                valid_sources.join(", ")
            ))
            .into());
        }

        if self.planner.detour_penalty_threshold <= self.planner.detour_bonus_threshold {
            return Err(MeetpointError::config(
                "Detour penalty threshold must be above the bonus threshold",
            )
            .into());
        }

        Ok(())
    }
}
