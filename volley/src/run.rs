//! Run orchestration: spawn virtual users, wait for the deadline, aggregate.
use crate::aggregate;
use crate::collector::OutcomeCollector;
use crate::scenario::{Scenario, ScenarioTable};
use crate::transport::Transport;
use crate::virtual_user::{Shared, VirtualUser};
use futures_util::future::join_all;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};
use volley_core::{ConfigError, RunConfig, RunSummary};

/// A validated load test, ready to be awaited.
///
/// # Example
/// ```no_run
/// use volley::prelude::*;
///
/// # async fn example(transport: HttpTransport) -> Result<(), ConfigError> {
/// let config = RunConfig::new(RunConfig::parse_base_url("https://example.com/api")?);
/// let summary = Run::new(config, vec![Scenario::get("users", 1., "users")], transport)?.await;
/// assert!(summary.passed());
/// # Ok(())
/// # }
/// ```
pub struct Run<T> {
    config: RunConfig,
    table: ScenarioTable,
    transport: T,
}

impl<T: Transport> Run<T> {
    /// Validate the configuration and scenarios. Nothing is spawned until the run is awaited.
    pub fn new(
        config: RunConfig,
        scenarios: Vec<Scenario>,
        transport: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = ScenarioTable::new(scenarios)?;
        Ok(Self {
            config,
            table,
            transport,
        })
    }

    #[instrument(name = "run", skip_all, fields(vus = self.config.vus))]
    pub async fn execute(self) -> RunSummary {
        let Run {
            config,
            table,
            transport,
        } = self;

        info!("Starting run with {config}");
        let names: Vec<String> = table.names().iter().map(|s| s.to_string()).collect();

        let collector = OutcomeCollector::new();
        let start = Instant::now();
        let shared = Arc::new(Shared {
            table,
            transport,
            collector: collector.clone(),
            base_url: config.base_url.clone(),
            think_time: config.think_time,
            check_latency: config.thresholds.check_latency,
            deadline: start + config.duration,
            grace_period: config.grace_period,
        });

        let handles: Vec<_> = (0..config.vus)
            .map(|id| {
                let rng = match config.seed {
                    Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(id as u64)),
                    None => SmallRng::from_entropy(),
                };
                let user = VirtualUser::new(id, shared.clone(), rng);
                tokio::spawn(user.run().in_current_span())
            })
            .collect();

        let mut issued = 0;
        for (id, res) in join_all(handles).await.into_iter().enumerate() {
            match res {
                Ok(count) => issued += count,
                Err(err) => error!("Virtual user {id} failed: {err}"),
            }
        }

        let elapsed = start.elapsed();
        let outcomes = collector.drain();
        debug!("{issued} requests issued, {} outcomes collected", outcomes.len());

        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let summary = aggregate::summarize(
            &outcomes,
            &names,
            &config.thresholds,
            config.vus,
            elapsed,
        );

        info!(
            "Run complete: {} requests in {:.2}s, verdict {}",
            summary.total.requests,
            elapsed.as_secs_f64(),
            summary.verdict
        );
        summary
    }
}

impl<T: Transport> IntoFuture for Run<T> {
    type Output = RunSummary;
    type IntoFuture = Pin<Box<dyn Future<Output = RunSummary> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::RequestSpec;
    use crate::transport::TransportError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use url::Url;
    use volley_core::{ThinkTime, Verdict};

    /// Answers each resource with a fixed status and latency and counts hits per path.
    #[derive(Default)]
    struct Canned {
        responses: HashMap<&'static str, (u16, Duration)>,
        hits: Mutex<HashMap<String, usize>>,
    }

    impl Canned {
        fn respond(mut self, path: &'static str, status: u16, latency: Duration) -> Self {
            self.responses.insert(path, (status, latency));
            self
        }
    }

    impl Transport for Canned {
        async fn execute(&self, request: &RequestSpec) -> Result<u16, TransportError> {
            let path = request
                .url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .unwrap_or_default()
                .to_string();
            *self.hits.lock().unwrap().entry(path.clone()).or_default() += 1;

            match self.responses.get(path.as_str()) {
                Some((status, latency)) => {
                    tokio::time::sleep(*latency).await;
                    Ok(*status)
                }
                None => Err(TransportError::Connect("no route".to_string())),
            }
        }
    }

    fn config(vus: usize, secs: u64) -> RunConfig {
        RunConfig::new(Url::parse("http://localhost/documents").unwrap())
            .vus(vus)
            .duration(Duration::from_secs(secs))
            .seed(42)
    }

    fn scenarios() -> Vec<Scenario> {
        vec![
            Scenario::get("friend_request", 0.625, "swap_requests"),
            Scenario::get("outing", 0.375, "users"),
        ]
    }

    #[tracing_test::traced_test]
    #[tokio::test(start_paused = true)]
    async fn healthy_target_passes() {
        let transport = Canned::default()
            .respond("swap_requests", 200, Duration::from_millis(40))
            .respond("users", 200, Duration::from_millis(80));

        let summary = Run::new(config(15, 32), scenarios(), transport)
            .unwrap()
            .await;

        assert_eq!(summary.verdict, Verdict::Pass);
        assert_eq!(summary.vus, 15);
        assert_eq!(summary.scenarios.len(), 2);
        assert!(summary.total.requests > 0);
        assert_eq!(summary.total.passed, summary.total.requests);

        let friend = summary.scenario("friend_request").unwrap();
        let outing = summary.scenario("outing").unwrap();
        assert_eq!(friend.requests + outing.requests, summary.total.requests);
        assert!(friend.requests > outing.requests);
        assert!(friend.latency.p95 >= Duration::from_millis(40));
        assert!(friend.latency.p95 < Duration::from_millis(45));
        assert!(logs_contain("Run complete"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_target_fails_on_latency() {
        let transport = Canned::default()
            .respond("swap_requests", 200, Duration::from_millis(400))
            .respond("users", 200, Duration::from_millis(400));

        let summary = Run::new(config(3, 10), scenarios(), transport)
            .unwrap()
            .await;

        assert_eq!(summary.total.status_ok, summary.total.requests);
        assert_eq!(summary.total.latency_ok, summary.total.requests);
        assert_eq!(summary.total.error_rate(), 0.);
        assert_eq!(summary.verdict, Verdict::Fail);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_target_fails_without_panicking() {
        let summary = Run::new(config(4, 5), scenarios(), Canned::default())
            .unwrap()
            .await;

        assert!(summary.total.requests > 0);
        assert_eq!(summary.total.transport_errors, summary.total.requests);
        assert_eq!(summary.total.error_rate(), 1.);
        assert_eq!(summary.verdict, Verdict::Fail);
    }

    #[tokio::test(start_paused = true)]
    async fn no_requests_start_after_deadline() {
        let transport = Canned::default()
            .respond("swap_requests", 200, Duration::from_millis(10))
            .respond("users", 200, Duration::from_millis(10));
        let config = config(2, 3).think_time(ThinkTime::new(Duration::from_secs(1), Duration::ZERO));

        let summary = Run::new(config, scenarios(), transport).unwrap().await;

        // Each user starts at 0s, ~1s and ~2s.
        assert_eq!(summary.total.requests, 6);
        assert!(summary.elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_runs_are_reproducible() {
        let run = || async {
            let transport = Canned::default()
                .respond("swap_requests", 200, Duration::from_millis(10))
                .respond("users", 200, Duration::from_millis(10));
            Run::new(config(3, 20), scenarios(), transport)
                .unwrap()
                .await
        };

        let first = run().await;
        let second = run().await;
        assert_eq!(
            first.scenario("outing").unwrap().requests,
            second.scenario("outing").unwrap().requests
        );
    }

    #[test]
    fn invalid_config_rejected_before_start() {
        assert_eq!(
            Run::new(config(0, 1), scenarios(), Canned::default()).err(),
            Some(ConfigError::NoVirtualUsers)
        );
        assert_eq!(
            Run::new(config(1, 1), vec![], Canned::default()).err(),
            Some(ConfigError::NoScenarios)
        );
    }
}
