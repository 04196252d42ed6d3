use metrics_util::AtomicBucket;
use std::sync::Arc;
use volley_core::RequestOutcome;

/// Append-only sink shared by every virtual user of a run.
///
/// Backed by a lock-free bucket, so recording never blocks other writers. Outcomes are read
/// back once, after all writers have stopped.
#[derive(Clone)]
pub struct OutcomeCollector {
    outcomes: Arc<AtomicBucket<RequestOutcome>>,
}

impl OutcomeCollector {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(AtomicBucket::new()),
        }
    }

    pub fn record(&self, outcome: RequestOutcome) {
        #[cfg(feature = "metrics")]
        record_metrics(&outcome);

        self.outcomes.push(outcome);
    }

    /// Take every recorded outcome, leaving the collector empty.
    pub fn drain(&self) -> Vec<RequestOutcome> {
        let mut outcomes = vec![];
        self.outcomes.clear_with(|block| outcomes.extend_from_slice(block));
        outcomes
    }
}

impl Default for OutcomeCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(outcome: &RequestOutcome) {
    let scenario = outcome.scenario.to_string();

    metrics::histogram!("volley.latency", "scenario" => scenario.clone())
        .record(outcome.latency.as_secs_f64());

    if outcome.succeeded {
        metrics::counter!("volley.success", "scenario" => scenario).increment(1);
    } else {
        metrics::counter!("volley.error", "scenario" => scenario).increment(1);
    }
}
