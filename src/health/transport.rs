//! Probe Transport Module
//!
//! The network seam used by health probes: one GET returning JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Issues a GET to `url` with `params` as query string and decodes the
    /// JSON body. Non-success statuses are errors.
    async fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Result<Value, FetchError>;
}

// == HTTP Transport ==
/// `reqwest`-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpProbeTransport {
    client: reqwest::Client,
}

impl HttpProbeTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("campus_cache/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProbeTransport for HttpProbeTransport {
    async fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }
}
