use crate::constants::*;
use crate::error::ConfigError;
use serde::Serialize;
use serde_with::{serde_as, DurationMilliSeconds};
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// Which checks decide whether a request counts against the error rate.
///
/// Every request is checked twice: its HTTP status must be 200, and its latency must be below
/// [`Thresholds::check_latency`]. Both checks are always recorded; the policy only controls
/// which of them feed the error rate used for the verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Only the HTTP status check (transport failures included).
    StatusOnly,
    /// A request is an error unless both the status and latency checks pass.
    #[default]
    StatusAndLatency,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::StatusOnly => write!(f, "status-only"),
            ErrorPolicy::StatusAndLatency => write!(f, "status-and-latency"),
        }
    }
}

/// Pass/fail boundaries evaluated at the end of a run.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thresholds {
    /// The run fails if p95 latency reaches this value.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub latency: Duration,
    /// The run fails if the error rate reaches this value.
    pub error_rate: f64,
    /// Per-request latency check.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub check_latency: Duration,
    pub error_policy: ErrorPolicy,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY_THRESHOLD,
            error_rate: DEFAULT_ERROR_RATE_THRESHOLD,
            check_latency: DEFAULT_CHECK_LATENCY,
            error_policy: ErrorPolicy::default(),
        }
    }
}

/// Uniform pause between consecutive requests of one virtual user, drawn from
/// `[min, min + range]`.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThinkTime {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub min: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub range: Duration,
}

impl ThinkTime {
    pub fn new(min: Duration, range: Duration) -> Self {
        Self { min, range }
    }

    /// Map a uniform draw in `[0, 1]` onto the pause interval.
    pub fn at(&self, draw: f64) -> Duration {
        self.min + self.range.mul_f64(draw.clamp(0., 1.))
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_DELAY_RANGE)
    }
}

/// Everything a run needs besides its scenarios. Immutable once the run starts.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub base_url: Url,
    pub vus: usize,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub duration: Duration,
    pub thresholds: Thresholds,
    pub think_time: ThinkTime,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub request_timeout: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub grace_period: Duration,
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            vus: DEFAULT_VUS,
            duration: DEFAULT_DURATION,
            thresholds: Thresholds::default(),
            think_time: ThinkTime::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            seed: None,
        }
    }

    /// Parse and sanity check a base URL. Only absolute `http`/`https` URLs with a host are
    /// accepted.
    pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        check_base_url(&url)?;
        Ok(url)
    }

    pub fn vus(mut self, vus: usize) -> Self {
        self.vus = vus;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn latency_threshold(mut self, latency: Duration) -> Self {
        self.thresholds.latency = latency;
        self
    }

    pub fn error_rate_threshold(mut self, error_rate: f64) -> Self {
        self.thresholds.error_rate = error_rate;
        self
    }

    pub fn check_latency(mut self, latency: Duration) -> Self {
        self.thresholds.check_latency = latency;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.thresholds.error_policy = policy;
        self
    }

    pub fn think_time(mut self, think_time: ThinkTime) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vus == 0 {
            return Err(ConfigError::NoVirtualUsers);
        }

        if self.duration.is_zero() || self.horizon().is_none() {
            return Err(ConfigError::InvalidDuration);
        }

        check_base_url(&self.base_url)?;

        if self.thresholds.latency.is_zero() || self.thresholds.check_latency.is_zero() {
            return Err(ConfigError::InvalidLatencyThreshold);
        }

        let error_rate = self.thresholds.error_rate;
        if !(0.0..=1.0).contains(&error_rate) {
            return Err(ConfigError::InvalidErrorRateThreshold(error_rate));
        }

        Ok(())
    }

    /// The latest instant a run started now could touch, if the clock can represent it.
    fn horizon(&self) -> Option<Instant> {
        let pause = self.think_time.min.checked_add(self.think_time.range)?;
        let span = self
            .duration
            .checked_add(self.grace_period)?
            .checked_add(pause)?;
        Instant::now().checked_add(span)
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vus={}, duration={}, base_url={}, p95<{}, error_rate<{:.2}",
            self.vus,
            humantime::format_duration(self.duration),
            self.base_url,
            humantime::format_duration(self.thresholds.latency),
            self.thresholds.error_rate,
        )
    }
}

fn check_base_url(url: &Url) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(())
}
