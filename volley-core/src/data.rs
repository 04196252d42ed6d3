use crate::config::ErrorPolicy;
use crate::constants::EXPECTED_STATUS;
use std::sync::Arc;
use std::time::Duration;

/// The recorded result of one executed request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub scenario: Arc<str>,
    /// `None` when the request never produced a response.
    pub status: Option<u16>,
    pub latency: Duration,
    /// Transport-level success: a response arrived with status 200.
    pub succeeded: bool,
    /// The response arrived faster than the check latency.
    pub latency_ok: bool,
    pub error: Option<String>,
}

impl RequestOutcome {
    pub fn response(
        scenario: Arc<str>,
        status: u16,
        latency: Duration,
        check_latency: Duration,
    ) -> Self {
        Self {
            scenario,
            status: Some(status),
            latency,
            succeeded: status == EXPECTED_STATUS,
            latency_ok: latency < check_latency,
            error: None,
        }
    }

    pub fn failure(scenario: Arc<str>, latency: Duration, error: impl ToString) -> Self {
        Self {
            scenario,
            status: None,
            latency,
            succeeded: false,
            latency_ok: false,
            error: Some(error.to_string()),
        }
    }

    pub fn is_transport_error(&self) -> bool {
        self.status.is_none()
    }

    /// Whether this request counts as a success under the given policy.
    pub fn passed(&self, policy: ErrorPolicy) -> bool {
        match policy {
            ErrorPolicy::StatusOnly => self.succeeded,
            ErrorPolicy::StatusAndLatency => self.succeeded && self.latency_ok,
        }
    }
}
