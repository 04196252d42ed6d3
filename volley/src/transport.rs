//! The seam between virtual users and the network.
use crate::scenario::RequestSpec;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Executes a request and reports the response status.
///
/// The returned future must resolve only once the full response body has been received, so the
/// caller can time the whole exchange.
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<u16, TransportError>> + Send;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("request still in flight after the shutdown grace period")]
    Abandoned,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<u16, TransportError> {
        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        // NOTE: Latency covers the full body, not just the headers.
        response.bytes().await?;

        Ok(status)
    }
}
