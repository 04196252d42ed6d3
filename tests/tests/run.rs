mod utils;
use utils::*;

use ntest::timeout;
use std::time::Duration;
use volley::prelude::*;
use volley_core::Breach;

fn firestore_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::get("friend_request", 0.625, "swap_requests"),
        Scenario::get("outing", 0.375, "users"),
    ]
}

#[tokio::test]
#[timeout(30_000)]
async fn healthy_service_passes() {
    let addr = init().await;
    let served_before = mock_service::hits();

    let summary = Run::new(config(addr, "documents"), firestore_scenarios(), transport())
        .unwrap()
        .await;

    assert_eq!(summary.verdict, Verdict::Pass, "{summary}");
    // other tests share the counter, so it can only have grown by more
    assert!(mock_service::hits() - served_before >= summary.total.requests);
    assert!(summary.total.requests >= 4);
    assert_eq!(summary.total.status_ok, summary.total.requests);
    assert_eq!(summary.total.transport_errors, 0);
    assert!(summary.elapsed < Duration::from_secs(4));
}

#[tokio::test]
#[timeout(30_000)]
async fn server_errors_fail_the_run() {
    let addr = init().await;

    let summary = Run::new(
        config(addr, "status"),
        vec![Scenario::get("broken", 1., "500")],
        transport(),
    )
    .unwrap()
    .await;

    assert_eq!(summary.total.status_ok, 0);
    assert_eq!(summary.total.transport_errors, 0);
    assert_eq!(summary.total.error_rate(), 1.);
    assert_eq!(summary.verdict, Verdict::Fail);
}

#[tokio::test]
#[timeout(30_000)]
async fn slow_service_fails_on_p95_alone() {
    let addr = init().await;

    let config = config(addr, "delay/ms").error_policy(ErrorPolicy::StatusOnly);
    let summary = Run::new(config, vec![Scenario::get("slow", 1., "400")], transport())
        .unwrap()
        .await;

    assert_eq!(summary.total.error_rate(), 0.);
    assert!(summary.total.latency.p95 >= Duration::from_millis(400));
    assert_eq!(summary.verdict, Verdict::Fail);
    assert!(summary
        .breaches
        .iter()
        .all(|b| matches!(b, Breach::LatencyP95 { .. })));
}

#[tokio::test]
#[timeout(30_000)]
async fn unreachable_service_records_transport_errors() {
    init().await;

    let base_url = RunConfig::parse_base_url("http://127.0.0.1:1/documents").unwrap();
    let config = RunConfig::new(base_url)
        .vus(2)
        .duration(Duration::from_secs(1))
        .think_time(ThinkTime::new(Duration::from_millis(100), Duration::ZERO));

    let summary = Run::new(config, firestore_scenarios(), transport())
        .unwrap()
        .await;

    assert!(summary.total.requests >= 2);
    assert_eq!(summary.total.transport_errors, summary.total.requests);
    assert_eq!(summary.verdict, Verdict::Fail);
}

#[tokio::test]
#[timeout(30_000)]
async fn long_think_time_bounds_request_count() {
    let addr = init().await;

    let config = config(addr, "documents")
        .vus(1)
        .duration(Duration::from_secs(2))
        .think_time(ThinkTime::new(Duration::from_secs(2), Duration::ZERO));
    let summary = Run::new(config, firestore_scenarios(), transport())
        .unwrap()
        .await;

    assert!((1..=2).contains(&summary.total.requests));
}
