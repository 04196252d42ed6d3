use crate::firestore;
use clap::{Parser, ValueEnum};
use std::str::FromStr;
use std::time::Duration;
use volley::Scenario;
use volley_core::{
    ConfigError, ErrorPolicy, RunConfig, ThinkTime, DEFAULT_CHECK_LATENCY, DEFAULT_DELAY_RANGE,
    DEFAULT_DURATION, DEFAULT_ERROR_RATE_THRESHOLD, DEFAULT_GRACE_PERIOD,
    DEFAULT_LATENCY_THRESHOLD, DEFAULT_MIN_DELAY, DEFAULT_REQUEST_TIMEOUT, DEFAULT_VUS,
};

#[derive(Parser, Debug)]
#[command(name = "volley", version, about = "Drive weighted HTTP traffic and check thresholds")]
pub struct VolleyCli {
    /// Number of concurrent virtual users.
    #[arg(long, default_value_t = DEFAULT_VUS)]
    pub vus: usize,

    /// Wall-clock length of the run, e.g. `32s` or `5m`.
    #[arg(long, default_value_t = DEFAULT_DURATION.into())]
    pub duration: humantime::Duration,

    /// Base URL every scenario path is appended to.
    #[arg(long, default_value = firestore::FIRESTORE_API)]
    pub base_url: String,

    /// The run fails if p95 latency reaches this many milliseconds.
    #[arg(long, default_value_t = DEFAULT_LATENCY_THRESHOLD.as_millis() as u64)]
    pub latency_threshold_ms: u64,

    /// The run fails if the error rate reaches this fraction.
    #[arg(long, default_value_t = DEFAULT_ERROR_RATE_THRESHOLD)]
    pub error_rate_threshold: f64,

    /// Per-request "response time acceptable" check, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_CHECK_LATENCY.as_millis() as u64)]
    pub check_latency_ms: u64,

    /// Shortest pause between two requests of one virtual user.
    #[arg(long, default_value_t = DEFAULT_MIN_DELAY.into())]
    pub min_delay: humantime::Duration,

    /// Random extra pause added on top of `--min-delay`.
    #[arg(long, default_value_t = DEFAULT_DELAY_RANGE.into())]
    pub delay_range: humantime::Duration,

    /// Per-request timeout.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.into())]
    pub timeout: humantime::Duration,

    /// How long in-flight requests may run past the end of the run.
    #[arg(long, default_value_t = DEFAULT_GRACE_PERIOD.into())]
    pub grace: humantime::Duration,

    /// Which checks count towards the error rate.
    #[arg(long, value_enum, default_value_t = PolicyArg::StatusAndLatency)]
    pub error_policy: PolicyArg,

    /// Seed for reproducible scenario selection and pacing.
    #[arg(long)]
    pub seed: Option<u64>,

    /// `NAME:WEIGHT:PATH`, repeatable. Replaces the default Firestore scenarios.
    #[arg(long = "scenario", value_name = "NAME:WEIGHT:PATH")]
    pub scenarios: Vec<ScenarioArg>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Status,
    StatusAndLatency,
}

impl From<PolicyArg> for ErrorPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Status => ErrorPolicy::StatusOnly,
            PolicyArg::StatusAndLatency => ErrorPolicy::StatusAndLatency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioArg {
    pub name: String,
    pub weight: f64,
    pub path: String,
}

impl FromStr for ScenarioArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(name), Some(weight), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected NAME:WEIGHT:PATH, got `{s}`"));
        };

        if name.is_empty() {
            return Err("scenario name must not be empty".to_string());
        }

        let weight = weight
            .parse::<f64>()
            .map_err(|err| format!("invalid weight `{weight}`: {err}"))?;

        Ok(Self {
            name: name.to_string(),
            weight,
            path: path.to_string(),
        })
    }
}

impl VolleyCli {
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let base_url = RunConfig::parse_base_url(&self.base_url)?;
        let mut config = RunConfig::new(base_url)
            .vus(self.vus)
            .duration(*self.duration)
            .latency_threshold(Duration::from_millis(self.latency_threshold_ms))
            .error_rate_threshold(self.error_rate_threshold)
            .check_latency(Duration::from_millis(self.check_latency_ms))
            .error_policy(self.error_policy.into())
            .think_time(ThinkTime::new(*self.min_delay, *self.delay_range))
            .request_timeout(*self.timeout)
            .grace_period(*self.grace);

        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            firestore::default_scenarios()
        } else {
            self.scenarios
                .iter()
                .map(|s| Scenario::get(&s.name, s.weight, &s.path))
                .collect()
        }
    }
}
