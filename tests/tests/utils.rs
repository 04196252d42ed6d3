use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::FmtSubscriber;
use volley::prelude::*;

/// Install logging once per test binary and start a fresh mock service.
#[allow(unused)]
pub async fn init() -> SocketAddr {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("volley=debug,mock_service=debug")
            .with_test_writer()
            .try_init();
    });

    mock_service::spawn()
        .await
        .expect("mock service failed to bind")
}

/// A short, fast-paced configuration aimed at the mock service.
#[allow(unused)]
pub fn config(addr: SocketAddr, prefix: &str) -> RunConfig {
    let base_url = RunConfig::parse_base_url(&format!("http://{addr}/{prefix}")).unwrap();
    RunConfig::new(base_url)
        .vus(4)
        .duration(Duration::from_secs(2))
        .think_time(ThinkTime::new(
            Duration::from_millis(50),
            Duration::from_millis(50),
        ))
        .request_timeout(Duration::from_secs(5))
        .grace_period(Duration::from_secs(1))
        .seed(7)
}

#[allow(unused)]
pub fn transport() -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5)).unwrap()
}
