//! Turns collected outcomes into a [`RunSummary`]. Pure: no clocks, no I/O.
use crate::measurement::{self, Latencies};
use std::collections::HashMap;
use std::time::Duration;
use volley_core::{
    Breach, ErrorPolicy, RequestOutcome, RunSummary, ScenarioStats, Thresholds, Verdict,
};

#[derive(Default)]
struct Tally {
    requests: u64,
    status_ok: u64,
    latency_ok: u64,
    passed: u64,
    transport_errors: u64,
    latencies: Latencies,
}

impl Tally {
    fn add(&mut self, outcome: &RequestOutcome, policy: ErrorPolicy) {
        self.requests += 1;
        self.status_ok += u64::from(outcome.succeeded);
        self.latency_ok += u64::from(outcome.latency_ok);
        self.passed += u64::from(outcome.passed(policy));
        self.transport_errors += u64::from(outcome.is_transport_error());
        self.latencies.record(outcome.latency);
    }

    fn into_stats(self, name: &str) -> ScenarioStats {
        ScenarioStats {
            name: name.to_string(),
            requests: self.requests,
            status_ok: self.status_ok,
            latency_ok: self.latency_ok,
            passed: self.passed,
            transport_errors: self.transport_errors,
            latency: self.latencies.summary(),
        }
    }
}

/// Aggregate per-scenario and overall statistics and evaluate the thresholds.
///
/// `scenarios` fixes the reporting order; every listed scenario appears in the summary even if
/// it was never selected. Outcomes for unlisted scenarios are appended after them.
pub fn summarize(
    outcomes: &[RequestOutcome],
    scenarios: &[&str],
    thresholds: &Thresholds,
    vus: usize,
    elapsed: Duration,
) -> RunSummary {
    let policy = thresholds.error_policy;

    let mut order: Vec<String> = scenarios.iter().map(|s| s.to_string()).collect();
    let mut index: HashMap<String, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), idx))
        .collect();
    let mut tallies: Vec<Tally> = order.iter().map(|_| Tally::default()).collect();
    let mut total = Tally::default();

    for outcome in outcomes {
        let idx = match index.get(&*outcome.scenario) {
            Some(idx) => *idx,
            None => {
                order.push(outcome.scenario.to_string());
                tallies.push(Tally::default());
                index.insert(outcome.scenario.to_string(), tallies.len() - 1);
                tallies.len() - 1
            }
        };

        tallies[idx].add(outcome, policy);
        total.add(outcome, policy);
    }

    let scenarios: Vec<ScenarioStats> = tallies
        .into_iter()
        .zip(&order)
        .map(|(tally, name)| tally.into_stats(name))
        .collect();
    let total = total.into_stats("total");

    let breaches = evaluate(&total, thresholds);
    let verdict = if breaches.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    RunSummary {
        vus,
        elapsed,
        thresholds: thresholds.clone(),
        scenarios,
        total,
        verdict,
        breaches,
    }
}

/// A run passes only if p95 latency and the error rate both stay strictly below their limits.
///
/// p95 is compared at histogram resolution: a p95 in the same bucket as the limit breaches it.
pub fn evaluate(total: &ScenarioStats, thresholds: &Thresholds) -> Vec<Breach> {
    if total.requests == 0 {
        return vec![Breach::NoRequests];
    }

    let mut breaches = vec![];

    if total.latency.p95 >= measurement::bucket_floor(thresholds.latency) {
        breaches.push(Breach::LatencyP95 {
            measured: total.latency.p95,
            limit: thresholds.latency,
        });
    }

    let error_rate = total.error_rate();
    if error_rate >= thresholds.error_rate {
        breaches.push(Breach::ErrorRate {
            measured: error_rate,
            limit: thresholds.error_rate,
        });
    }

    breaches
}
