use crate::collector::OutcomeCollector;
use crate::scenario::{RequestSpec, ScenarioTable};
use crate::transport::{Transport, TransportError};
use rand::rngs::SmallRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};
use url::Url;
use volley_core::{RequestOutcome, ThinkTime};

/// State shared by every virtual user of a run.
pub(crate) struct Shared<T> {
    pub table: ScenarioTable,
    pub transport: T,
    pub collector: OutcomeCollector,
    pub base_url: Url,
    pub think_time: ThinkTime,
    pub check_latency: Duration,
    pub deadline: Instant,
    pub grace_period: Duration,
}

/// One simulated client: select, execute, record, pause, until the deadline.
pub(crate) struct VirtualUser<T> {
    id: usize,
    shared: Arc<Shared<T>>,
    rng: SmallRng,
}

impl<T: Transport> VirtualUser<T> {
    pub fn new(id: usize, shared: Arc<Shared<T>>, rng: SmallRng) -> Self {
        Self { id, shared, rng }
    }

    /// Runs until the deadline and returns the number of requests issued.
    pub async fn run(mut self) -> u64 {
        debug!("Virtual user {} starting", self.id);
        let mut issued = 0;

        // NOTE: No request may start at or after the deadline.
        while Instant::now() < self.shared.deadline {
            let scenario = self.shared.table.choose(&mut self.rng);
            let name = scenario.shared_name();
            let request = scenario.request(&self.shared.base_url);

            let outcome = self.issue(name, &request).await;
            trace!(
                "vu={} scenario={} status={:?} latency={:?}",
                self.id,
                outcome.scenario,
                outcome.status,
                outcome.latency
            );
            self.shared.collector.record(outcome);
            issued += 1;

            let pause = self.shared.think_time.at(self.rng.gen::<f64>());
            let wake = (Instant::now() + pause).min(self.shared.deadline);
            sleep_until(wake).await;
        }

        debug!("Virtual user {} finished after {issued} requests", self.id);
        issued
    }

    async fn issue(&self, scenario: Arc<str>, request: &RequestSpec) -> RequestOutcome {
        let shared = &self.shared;
        let start = Instant::now();
        let cutoff = shared.deadline + shared.grace_period;

        match timeout_at(cutoff, shared.transport.execute(request)).await {
            Ok(Ok(status)) => {
                RequestOutcome::response(scenario, status, start.elapsed(), shared.check_latency)
            }
            Ok(Err(err)) => {
                debug!("vu={} scenario={scenario} transport error: {err}", self.id);
                RequestOutcome::failure(scenario, start.elapsed(), err)
            }
            Err(_) => {
                warn!(
                    "vu={} scenario={scenario} abandoned after {:?}",
                    self.id,
                    start.elapsed()
                );
                RequestOutcome::failure(scenario, start.elapsed(), TransportError::Abandoned)
            }
        }
    }
}
