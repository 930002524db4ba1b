use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use meetpoint::cache::RouteCache;
use meetpoint::candidates;
use meetpoint::config::MeetpointConfig;
use meetpoint::evaluator::PlanEvaluator;
use meetpoint::planner::MeetingPlanner;
use meetpoint::routing::{AmapClient, RouteCostService};
use meetpoint::web;

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            err,
        );
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let config = MeetpointConfig::load()?;
    if config.routing.api_key.is_none() {
        warn!("no routing API key configured, all routes will be estimated");
    }

    let amap = Arc::new(AmapClient::new(&config)?);
    let cache = Arc::new(RouteCache::new(
        Duration::from_secs(u64::from(config.cache.ttl_minutes) * 60),
        config.cache.max_entries as usize,
    ));
    let service = Arc::new(RouteCostService::new(
        amap.clone(),
        cache,
        config.routing.max_concurrent_requests as usize,
        Duration::from_secs(config.routing.timeout_seconds.into()),
    ));

    let source = candidates::source_from_config(&config, amap);
    let planner = Arc::new(MeetingPlanner::new(
        source,
        PlanEvaluator::new(service),
        &config,
    ));

    info!(version = meetpoint::VERSION, "starting meetpoint");
    web::run(planner, config.server.port).await
}
