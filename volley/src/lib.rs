#![cfg_attr(docsrs, feature(doc_cfg))]
//! Volley drives weighted HTTP traffic from a fixed pool of virtual users for a fixed
//! duration and summarises the run against latency and error-rate thresholds.
//!
//! ```no_run
//! use volley::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let base_url = RunConfig::parse_base_url("https://example.com/v1/documents")?;
//! let config = RunConfig::new(base_url)
//!     .vus(15)
//!     .duration(Duration::from_secs(32));
//! let transport = HttpTransport::new(config.request_timeout)?;
//! let scenarios = vec![
//!     Scenario::get("friend_request", 0.625, "swap_requests"),
//!     Scenario::get("outing", 0.375, "users"),
//! ];
//!
//! let summary = Run::new(config, scenarios, transport)?.await;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod collector;
pub mod run;
pub mod scenario;
pub mod transport;

pub(crate) mod measurement;
pub(crate) mod virtual_user;

pub use run::Run;
pub use scenario::{RequestSpec, Scenario, ScenarioTable};

pub mod prelude {
    pub use crate::run::Run;
    pub use crate::scenario::{RequestSpec, Scenario, ScenarioTable};
    pub use crate::transport::{HttpTransport, Transport, TransportError};

    pub use volley_core::{
        ConfigError, ErrorPolicy, RunConfig, RunSummary, ThinkTime, Thresholds, Verdict,
    };
}
