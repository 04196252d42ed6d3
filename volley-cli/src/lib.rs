//! Command line runner for Volley.
//!
//! Parses the run configuration from flags, drives the default Firestore scenarios (or the
//! ones given with `--scenario`) and maps the verdict onto the process exit status.
pub mod cli;
pub mod firestore;
pub mod report;

use cli::VolleyCli;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use volley::prelude::*;

pub const DEFAULT_LOG_FILTER: &str = "volley=info,volley_cli=info";

/// Install the global subscriber. Logs go to stderr so stdout only carries the report.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a load test from parsed arguments, print the report and return the exit status.
pub async fn execute(args: VolleyCli) -> anyhow::Result<u8> {
    let config = args.run_config()?;
    let transport = HttpTransport::new(config.request_timeout)?;
    let run = Run::new(config, args.scenarios(), transport)?;

    let summary = run.await;
    println!("{}", report::render(&summary, args.format)?);

    Ok(report::exit_status(summary.verdict))
}
