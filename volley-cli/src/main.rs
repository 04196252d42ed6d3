use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use volley_cli::cli::VolleyCli;
use volley_cli::report::{EXIT_CONFIG_ERROR, EXIT_RUNTIME_ERROR};
use volley_core::ConfigError;

#[tokio::main]
async fn main() -> ExitCode {
    volley_cli::init_logging();
    let args = VolleyCli::parse();

    match volley_cli::execute(args).await {
        Ok(status) => ExitCode::from(status),
        Err(err) if err.is::<ConfigError>() => {
            eprintln!("configuration error: {err}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
        Err(err) => {
            error!("Load test failed: {err:#}");
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}
