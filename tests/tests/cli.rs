mod utils;
use utils::*;

use clap::Parser;
use ntest::timeout;
use volley_cli::cli::VolleyCli;
use volley_cli::report::{EXIT_PASS, EXIT_THRESHOLD_FAILED};
use volley_core::ConfigError;

fn args(extra: &[&str]) -> VolleyCli {
    let base = [
        "volley",
        "--vus",
        "2",
        "--duration",
        "1s",
        "--min-delay",
        "50ms",
        "--delay-range",
        "50ms",
    ];
    VolleyCli::try_parse_from(base.iter().chain(extra.iter()).copied()).unwrap()
}

#[tokio::test]
#[timeout(30_000)]
async fn passing_run_exits_zero() {
    let addr = init().await;
    let base_url = format!("http://{addr}/documents");

    let status = volley_cli::execute(args(&["--base-url", &base_url]))
        .await
        .unwrap();

    assert_eq!(status, EXIT_PASS);
}

#[tokio::test]
#[timeout(30_000)]
async fn failing_run_exits_non_zero() {
    let addr = init().await;
    let base_url = format!("http://{addr}/status");

    let status = volley_cli::execute(args(&[
        "--base-url",
        &base_url,
        "--scenario",
        "teapot:1:418",
        "--format",
        "json",
    ]))
    .await
    .unwrap();

    assert_eq!(status, EXIT_THRESHOLD_FAILED);
}

#[tokio::test]
async fn config_errors_surface_before_running() {
    let args = VolleyCli::try_parse_from(["volley", "--vus", "0"]).unwrap();
    let err = volley_cli::execute(args).await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::NoVirtualUsers)
    );
}
