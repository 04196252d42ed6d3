use hdrhistogram::Histogram;
use std::time::Duration;
use volley_core::LatencySummary;

/// Latencies are recorded in microseconds. Four significant figures keep whole-millisecond
/// values under a quarter second exact, and bound the relative error to 0.01% above that.
const SIGNIFICANT_FIGURES: u8 = 4;

/// Latency distribution over a finished set of requests.
///
/// Every reported value is the lower bound of the histogram bucket it falls in, so a latency
/// that lands on a bucket boundary is reported exactly.
#[derive(Debug)]
pub(crate) struct Latencies {
    histogram: Histogram<u64>,
}

impl Latencies {
    pub fn new() -> Self {
        Self {
            // Auto-resizing; only fails for more than five significant figures.
            histogram: Histogram::new(SIGNIFICANT_FIGURES)
                .expect("significant figures are within hdrhistogram's range"),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        self.histogram.saturating_record(micros(latency));
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    /// Nearest-rank quantile; zero when there are no samples.
    pub fn quantile(&self, quantile: f64) -> Duration {
        if self.len() == 0 {
            return Duration::ZERO;
        }

        self.floor(self.histogram.value_at_quantile(quantile.clamp(0., 1.)))
    }

    pub fn summary(&self) -> LatencySummary {
        if self.len() == 0 {
            return LatencySummary::default();
        }

        LatencySummary {
            min: self.floor(self.histogram.min()),
            mean: from_micros_f64(self.histogram.mean()),
            std_dev: from_micros_f64(self.histogram.stdev()),
            p50: self.quantile(0.50),
            p90: self.quantile(0.90),
            p95: self.quantile(0.95),
            p99: self.quantile(0.99),
            max: self.floor(self.histogram.max()),
        }
    }

    fn floor(&self, micros: u64) -> Duration {
        Duration::from_micros(self.histogram.lowest_equivalent(micros))
    }
}

impl Default for Latencies {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Duration> for Latencies {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        let mut latencies = Self::new();
        for latency in iter {
            latencies.record(latency);
        }
        latencies
    }
}

/// Round `latency` down to the start of the bucket it would be recorded in.
///
/// Comparing a reported quantile against a limit at this resolution means a latency equal to
/// the limit always compares as reaching it.
pub(crate) fn bucket_floor(latency: Duration) -> Duration {
    Latencies::new().floor(micros(latency))
}

fn micros(latency: Duration) -> u64 {
    u64::try_from(latency.as_micros()).unwrap_or(u64::MAX)
}

fn from_micros_f64(micros: f64) -> Duration {
    if micros.is_finite() && micros > 0. {
        Duration::from_secs_f64(micros / 1e6)
    } else {
        Duration::ZERO
    }
}
