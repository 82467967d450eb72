//! Turns the tracked city list into an ordered list of weather view models.
//!
//! Per-city lookups are independent, so they fan out concurrently (bounded by a
//! semaphore) and the results are reassembled into input order before being
//! published. Each run is tagged with a generation counter: when a newer run
//! starts before an older one finishes, the older run's results are discarded
//! on arrival instead of overwriting fresher data.

use crate::model::{UnitSystem, WeatherViewModel};
use crate::provider::WeatherProvider;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;

/// Upper bound on simultaneous lookups per refresh cycle.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// How long a single city lookup may take before it counts as failed.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RefreshCoordinator {
    provider: Arc<dyn WeatherProvider>,
    limit: Arc<Semaphore>,
    timeout: Duration,
    cycle: AtomicU64,
    published: watch::Sender<Vec<WeatherViewModel>>,
}

impl RefreshCoordinator {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_limits(provider, DEFAULT_MAX_IN_FLIGHT, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_limits(
        provider: Arc<dyn WeatherProvider>,
        max_in_flight: usize,
        timeout: Duration,
    ) -> Self {
        let (published, _) = watch::channel(Vec::new());

        Self {
            provider,
            limit: Arc::new(Semaphore::new(max_in_flight.max(1))),
            timeout,
            cycle: AtomicU64::new(0),
            published,
        }
    }

    /// Latest published view-model list, updated whenever a refresh cycle
    /// completes without being superseded.
    pub fn subscribe(&self) -> watch::Receiver<Vec<WeatherViewModel>> {
        self.published.subscribe()
    }

    /// Fetches current weather for every city and returns one view model per
    /// successful lookup, in city order. Failed or timed-out lookups are
    /// omitted.
    ///
    /// Returns `None` when a newer cycle started while this one was in flight;
    /// in that case nothing is published and the stale results are dropped.
    pub async fn refresh(
        &self,
        cities: &[String],
        unit: UnitSystem,
    ) -> Option<Vec<WeatherViewModel>> {
        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(cycle, cities = cities.len(), %unit, "starting refresh cycle");

        let mut tasks = JoinSet::new();
        for (index, city) in cities.iter().cloned().enumerate() {
            let provider = Arc::clone(&self.provider);
            let limit = Arc::clone(&self.limit);
            let timeout = self.timeout;

            tasks.spawn(async move {
                // The semaphore lives as long as the coordinator, so acquire
                // only fails if the task outlives it; treat that as a miss.
                let _permit = limit.acquire_owned().await.ok()?;

                match tokio::time::timeout(timeout, provider.current(&city, unit)).await {
                    Ok(Ok(snapshot)) => {
                        Some((index, WeatherViewModel::from_snapshot(&snapshot, unit)))
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(%city, error = %err, "weather lookup failed");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(%city, "weather lookup timed out");
                        None
                    }
                }
            });
        }

        let mut slots: Vec<Option<WeatherViewModel>> = vec![None; cities.len()];
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some((index, view))) = joined {
                slots[index] = Some(view);
            }
        }

        let views: Vec<WeatherViewModel> = slots.into_iter().flatten().collect();

        // The staleness check must happen inside the sender's closure: the
        // watch channel serializes mutations, so a newer cycle cannot slip in
        // between this cycle passing the check and writing its results.
        let is_current = self.published.send_if_modified(|current| {
            if self.cycle.load(Ordering::SeqCst) == cycle {
                *current = views.clone();
                true
            } else {
                false
            }
        });

        if !is_current {
            tracing::debug!(cycle, "discarding superseded refresh cycle");
            return None;
        }
        Some(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherSnapshot;
    use crate::provider::LookupError;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::{HashMap, HashSet};

    /// Provider returning canned snapshots, with optional per-city delays and
    /// scripted failures.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        delays: HashMap<String, Duration>,
        failing: HashSet<String>,
    }

    impl ScriptedProvider {
        fn delayed(mut self, city: &str, millis: u64) -> Self {
            self.delays.insert(city.to_string(), Duration::from_millis(millis));
            self
        }

        fn failing(mut self, city: &str) -> Self {
            self.failing.insert(city.to_string());
            self
        }
    }

    fn snapshot_for(city: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            city: city.to_string(),
            country: "XX".to_string(),
            temperature: 20.0,
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            observed_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
            timezone_offset_secs: 0,
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current(
            &self,
            city: &str,
            _unit: UnitSystem,
        ) -> Result<WeatherSnapshot, LookupError> {
            if let Some(delay) = self.delays.get(city) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(city) {
                return Err(LookupError::NotFound);
            }

            Ok(snapshot_for(city))
        }
    }

    /// Provider that holds one city's lookup until released, so tests can pin
    /// down exactly when a cycle is allowed to finish.
    #[derive(Debug)]
    struct GatedProvider {
        gated_city: String,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl WeatherProvider for GatedProvider {
        async fn current(
            &self,
            city: &str,
            _unit: UnitSystem,
        ) -> Result<WeatherSnapshot, LookupError> {
            if city == self.gated_city {
                self.release.notified().await;
            }

            Ok(snapshot_for(city))
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn city_names(views: &[WeatherViewModel]) -> Vec<&str> {
        views.iter().map(|v| v.city.as_str()).collect()
    }

    #[tokio::test]
    async fn output_order_matches_input_order_regardless_of_completion_order() {
        // The first city finishes last; order must still follow the input.
        let provider = ScriptedProvider::default().delayed("Sydney", 40).delayed("Cairo", 10);
        let coordinator = RefreshCoordinator::new(Arc::new(provider));

        let views = coordinator
            .refresh(&cities(&["Sydney", "Tokyo", "Cairo"]), UnitSystem::Metric)
            .await
            .expect("single cycle is never superseded");

        assert_eq!(city_names(&views), ["Sydney", "Tokyo", "Cairo"]);
    }

    #[tokio::test]
    async fn failed_lookups_are_omitted_not_replaced() {
        let provider = ScriptedProvider::default().failing("Tokyo");
        let coordinator = RefreshCoordinator::new(Arc::new(provider));

        let views = coordinator
            .refresh(&cities(&["Sydney", "Tokyo", "Cairo"]), UnitSystem::Metric)
            .await
            .expect("cycle completes");

        assert_eq!(city_names(&views), ["Sydney", "Cairo"]);
    }

    #[tokio::test]
    async fn a_timed_out_lookup_counts_as_failed() {
        let provider = ScriptedProvider::default().delayed("Sydney", 100);
        let coordinator = RefreshCoordinator::with_limits(
            Arc::new(provider),
            DEFAULT_MAX_IN_FLIGHT,
            Duration::from_millis(10),
        );

        let views = coordinator
            .refresh(&cities(&["Sydney", "Tokyo"]), UnitSystem::Metric)
            .await
            .expect("cycle completes");

        assert_eq!(city_names(&views), ["Tokyo"]);
    }

    #[tokio::test]
    async fn a_newer_cycle_supersedes_an_in_flight_one() {
        let provider = ScriptedProvider::default().delayed("Sydney", 150);
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(provider)));

        let slow = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator.refresh(&cities(&["Sydney"]), UnitSystem::Metric).await
            })
        };

        // Let the slow cycle get going before starting the next one.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fresh = coordinator
            .refresh(&cities(&["Tokyo"]), UnitSystem::Metric)
            .await
            .expect("newest cycle publishes");
        assert_eq!(city_names(&fresh), ["Tokyo"]);

        let stale = slow.await.expect("task completes");
        assert!(stale.is_none(), "superseded cycle must not publish");

        let published = coordinator.subscribe().borrow().clone();
        assert_eq!(city_names(&published), ["Tokyo"]);
    }

    #[tokio::test]
    async fn a_superseded_cycle_finishing_last_still_publishes_nothing() {
        let release = Arc::new(tokio::sync::Notify::new());
        let provider =
            GatedProvider { gated_city: "Sydney".to_string(), release: Arc::clone(&release) };
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(provider)));

        let slow = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator.refresh(&cities(&["Sydney"]), UnitSystem::Metric).await
            })
        };

        // Let the gated cycle reach its lookup before the newer one runs.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fresh = coordinator
            .refresh(&cities(&["Tokyo"]), UnitSystem::Metric)
            .await
            .expect("newest cycle publishes");
        assert_eq!(city_names(&fresh), ["Tokyo"]);

        // Only now may the stale cycle's lookup succeed; its results arrive
        // strictly after the fresh ones and must be dropped, not published.
        release.notify_one();

        let stale = slow.await.expect("task completes");
        assert!(stale.is_none(), "superseded cycle must not publish");

        let published = coordinator.subscribe().borrow().clone();
        assert_eq!(city_names(&published), ["Tokyo"]);
    }

    #[tokio::test]
    async fn an_empty_city_list_publishes_an_empty_result() {
        let coordinator = RefreshCoordinator::new(Arc::new(ScriptedProvider::default()));

        let views = coordinator.refresh(&[], UnitSystem::Metric).await.expect("cycle completes");

        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn fan_out_is_bounded_but_all_cities_are_fetched() {
        let provider = ScriptedProvider::default()
            .delayed("A", 10)
            .delayed("B", 10)
            .delayed("C", 10)
            .delayed("D", 10)
            .delayed("E", 10);
        let coordinator =
            RefreshCoordinator::with_limits(Arc::new(provider), 2, DEFAULT_LOOKUP_TIMEOUT);

        let views = coordinator
            .refresh(&cities(&["A", "B", "C", "D", "E"]), UnitSystem::Metric)
            .await
            .expect("cycle completes");

        assert_eq!(city_names(&views), ["A", "B", "C", "D", "E"]);
    }
}
