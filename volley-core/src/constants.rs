use std::time::Duration;

/// The only HTTP status counted as a successful response.
pub const EXPECTED_STATUS: u16 = 200;

pub const DEFAULT_VUS: usize = 15;

pub const DEFAULT_DURATION: Duration = Duration::from_secs(32);

/// The default ceiling for p95 latency.
pub const DEFAULT_LATENCY_THRESHOLD: Duration = Duration::from_millis(310);

/// The default ceiling for the overall error rate.
pub const DEFAULT_ERROR_RATE_THRESHOLD: f64 = 0.05;

/// The default per-request "acceptable latency" check.
pub const DEFAULT_CHECK_LATENCY: Duration = Duration::from_millis(500);

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);

pub const DEFAULT_DELAY_RANGE: Duration = Duration::from_millis(1500);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// How long in-flight requests may run past the deadline before being abandoned.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);
