//! Route cost resolution: cache, bounded concurrent fan-out, estimate fallback

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::estimate;
use super::provider::RoutingProvider;
use crate::cache::{RouteCache, RouteKey};
use crate::models::{Coordinate, RouteCost, TransportMode};

/// Route cost service wrapping the external provider.
///
/// `cost` never fails: any provider error, timeout, or implausible response
/// is replaced with the closed-form estimate so a single bad lookup cannot
/// block scoring.
pub struct RouteCostService {
    provider: Arc<dyn RoutingProvider>,
    cache: Arc<RouteCache>,
    limiter: Arc<Semaphore>,
    lookup_timeout: Duration,
}

impl RouteCostService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn RoutingProvider>,
        cache: Arc<RouteCache>,
        max_concurrent: usize,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            lookup_timeout,
        }
    }

    /// Resolve the travel cost between two points for one transport mode.
    #[instrument(level = "debug", skip(self), fields(mode = mode.as_str()))]
    pub async fn cost(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        city: Option<&str>,
    ) -> RouteCost {
        let key = RouteKey::new(mode, origin, destination, city);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let cost = self.lookup(origin, destination, mode, city).await;
        self.cache.put(key, cost.clone());
        cost
    }

    async fn lookup(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        city: Option<&str>,
    ) -> RouteCost {
        let Ok(_permit) = self.limiter.acquire().await else {
            // Semaphore closed only during shutdown
            return estimate::estimate_cost(origin, destination, mode);
        };

        match timeout(
            self.lookup_timeout,
            self.provider.route(origin, destination, mode, city),
        )
        .await
        {
            Ok(Ok(cost)) if cost.is_plausible() => {
                debug!("provider lookup succeeded");
                cost
            }
            Ok(Ok(_)) => {
                warn!(
                    mode = mode.as_str(),
                    "provider returned implausible cost, using estimate"
                );
                estimate::estimate_cost(origin, destination, mode)
            }
            Ok(Err(err)) => {
                warn!(
                    mode = mode.as_str(),
                    error = %err,
                    "provider lookup failed, using estimate"
                );
                estimate::estimate_cost(origin, destination, mode)
            }
            Err(_) => {
                warn!(
                    mode = mode.as_str(),
                    timeout_s = self.lookup_timeout.as_secs(),
                    "provider lookup timed out, using estimate"
                );
                estimate::estimate_cost(origin, destination, mode)
            }
        }
    }

    /// Resolve a batch of lookups sharing one destination concurrently.
    ///
    /// All lookups complete before this returns; results are keyed by the
    /// caller-supplied id.
    pub async fn batch(
        &self,
        origins: &[(String, Coordinate, TransportMode)],
        destination: Coordinate,
        city: Option<&str>,
    ) -> HashMap<String, RouteCost> {
        let lookups = origins.iter().map(|(id, origin, mode)| async move {
            let cost = self.cost(*origin, destination, *mode, city).await;
            (id.clone(), cost)
        });

        join_all(lookups).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::Result;
    use crate::error::MeetpointError;

    struct FailingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RoutingProvider for FailingProvider {
        async fn route(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
            _mode: TransportMode,
            _city: Option<&str>,
        ) -> Result<RouteCost> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MeetpointError::provider("always down"))
        }
    }

    struct FixedProvider {
        duration_min: f64,
    }

    #[async_trait]
    impl RoutingProvider for FixedProvider {
        async fn route(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
            _mode: TransportMode,
            _city: Option<&str>,
        ) -> Result<RouteCost> {
            Ok(RouteCost {
                duration_min: self.duration_min,
                distance_km: 2.0,
                path: vec![],
                segments: vec![],
                estimated: false,
            })
        }
    }

    fn service(provider: Arc<dyn RoutingProvider>) -> RouteCostService {
        RouteCostService::new(
            provider,
            Arc::new(RouteCache::new(Duration::from_secs(60), 64)),
            4,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_estimate() {
        let svc = service(Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        }));
        let origin = Coordinate::new(116.427_115, 39.903_536);
        let destination = Coordinate::new(116.443_467, 39.906_594);

        let cost = svc.cost(origin, destination, TransportMode::Driving, None).await;

        assert!(cost.estimated);
        assert_eq!(cost.duration_min, 12.0);
    }

    #[tokio::test]
    async fn test_implausible_cost_falls_back_to_estimate() {
        let svc = service(Arc::new(FixedProvider {
            duration_min: f64::NAN,
        }));
        let cost = svc
            .cost(
                Coordinate::new(116.42, 39.90),
                Coordinate::new(116.44, 39.91),
                TransportMode::Walking,
                None,
            )
            .await;
        assert!(cost.estimated);
    }

    #[tokio::test]
    async fn test_cache_prevents_repeat_lookups() {
        let provider = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let svc = service(provider.clone());
        let origin = Coordinate::new(116.42, 39.90);
        let destination = Coordinate::new(116.44, 39.91);

        svc.cost(origin, destination, TransportMode::Driving, None).await;
        svc.cost(origin, destination, TransportMode::Driving, None).await;

        // Fallback results are cacheable too
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_resolves_all_origins() {
        let svc = service(Arc::new(FixedProvider { duration_min: 15.0 }));
        let origins = vec![
            ("a".to_string(), Coordinate::new(116.41, 39.90), TransportMode::Driving),
            ("b".to_string(), Coordinate::new(116.46, 39.91), TransportMode::Transit),
            ("c".to_string(), Coordinate::new(116.43, 39.92), TransportMode::Walking),
        ];

        let results = svc
            .batch(&origins, Coordinate::new(116.44, 39.91), Some("beijing"))
            .await;

        assert_eq!(results.len(), 3);
        assert!(origins.iter().all(|(id, _, _)| results.contains_key(id)));
        assert_eq!(results["b"].duration_min, 15.0);
    }
}
