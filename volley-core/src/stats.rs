use crate::config::Thresholds;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_with::{serde_as, DurationMilliSecondsWithFrac};
use std::fmt;
use std::time::Duration;

/// Latency distribution of a set of requests.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub min: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub mean: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub std_dev: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p50: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p90: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p95: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p99: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub max: Duration,
}

/// Counts for one scenario, or for the whole run.
///
/// Serializes with its derived `success_rate` and `error_rate` alongside the counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioStats {
    pub name: String,
    pub requests: u64,
    /// Responses with status 200.
    pub status_ok: u64,
    /// Responses faster than the check latency.
    pub latency_ok: u64,
    /// Requests that count as a success under the run's error policy.
    pub passed: u64,
    /// Requests that never produced a response.
    pub transport_errors: u64,
    pub latency: LatencySummary,
}

impl ScenarioStats {
    pub fn failed(&self) -> u64 {
        self.requests - self.passed
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.passed, self.requests)
    }

    pub fn error_rate(&self) -> f64 {
        ratio(self.failed(), self.requests)
    }
}

impl Serialize for ScenarioStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScenarioStats", 9)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("requests", &self.requests)?;
        state.serialize_field("status_ok", &self.status_ok)?;
        state.serialize_field("latency_ok", &self.latency_ok)?;
        state.serialize_field("passed", &self.passed)?;
        state.serialize_field("transport_errors", &self.transport_errors)?;
        state.serialize_field("success_rate", &self.success_rate())?;
        state.serialize_field("error_rate", &self.error_rate())?;
        state.serialize_field("latency", &self.latency)?;
        state.end()
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.
    } else {
        part as f64 / total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// A threshold the run did not meet.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "threshold", rename_all = "snake_case")]
pub enum Breach {
    LatencyP95 {
        #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
        measured: Duration,
        #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
        limit: Duration,
    },
    ErrorRate {
        measured: f64,
        limit: f64,
    },
    NoRequests,
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breach::LatencyP95 { measured, limit } => {
                write!(f, "p(95)={} is not < {}", ms(*measured), ms(*limit))
            }
            Breach::ErrorRate { measured, limit } => {
                write!(f, "error rate={measured:.4} is not < {limit:.4}")
            }
            Breach::NoRequests => write!(f, "no requests were recorded"),
        }
    }
}

/// Final report of a run. Scenarios are listed in declaration order.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub vus: usize,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub elapsed: Duration,
    pub thresholds: Thresholds,
    pub scenarios: Vec<ScenarioStats>,
    pub total: ScenarioStats,
    pub verdict: Verdict,
    pub breaches: Vec<Breach>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Requests per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            self.total.requests as f64 / secs
        } else {
            0.
        }
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioStats> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

fn ms(d: Duration) -> String {
    format!("{:.2}ms", d.as_secs_f64() * 1e3)
}

fn write_row(f: &mut fmt::Formatter<'_>, stats: &ScenarioStats) -> fmt::Result {
    writeln!(
        f,
        "  {:<20} {:>8} {:>9.2}% {:>10} {:>10} {:>10} {:>10} {:>10}",
        stats.name,
        stats.requests,
        stats.success_rate() * 100.,
        ms(stats.latency.p50),
        ms(stats.latency.p90),
        ms(stats.latency.p95),
        ms(stats.latency.p99),
        ms(stats.latency.max),
    )
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = &self.total;

        writeln!(
            f,
            "  vus={} elapsed={:.2}s requests={} ({:.2}/s)",
            self.vus,
            self.elapsed.as_secs_f64(),
            total.requests,
            self.throughput(),
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "scenario", "reqs", "success", "p50", "p90", "p95", "p99", "max"
        )?;
        for stats in &self.scenarios {
            write_row(f, stats)?;
        }
        write_row(f, total)?;
        writeln!(f)?;

        writeln!(
            f,
            "  checks: status is 200 {}/{}, response time < {} {}/{}, transport errors {}",
            total.status_ok,
            total.requests,
            ms(self.thresholds.check_latency),
            total.latency_ok,
            total.requests,
            total.transport_errors,
        )?;
        writeln!(
            f,
            "  latency: min={} mean={} std_dev={}",
            ms(total.latency.min),
            ms(total.latency.mean),
            ms(total.latency.std_dev),
        )?;
        writeln!(
            f,
            "  error rate ({}): {:.4}",
            self.thresholds.error_policy,
            total.error_rate()
        )?;
        writeln!(f)?;

        for breach in &self.breaches {
            writeln!(f, "  ✗ {breach}")?;
        }
        write!(f, "  verdict: {}", self.verdict)
    }
}
