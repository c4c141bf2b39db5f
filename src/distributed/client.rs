use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, AppResult, DistributedError, HttpError};
use crate::http::DEFAULT_USER_AGENT;

/// Client for master/slave control traffic. Each call is a single attempt.
#[derive(Debug, Clone)]
pub struct ControlClient {
    client: Client,
}

impl ControlClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self { client })
    }

    /// POSTs `body` as JSON to `http://{addr}{path}` and requires a 2xx reply.
    ///
    /// # Errors
    ///
    /// Returns an error when the peer is unreachable, the call times out, or
    /// the peer answers with a non-success status.
    pub async fn post_json<T>(
        &self,
        addr: &str,
        path: &'static str,
        body: &T,
    ) -> Result<(), DistributedError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(endpoint_url(addr, path))
            .json(body)
            .send()
            .await
            .map_err(|err| DistributedError::Request {
                addr: addr.to_owned(),
                path,
                source: err,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(DistributedError::UnexpectedStatus {
                addr: addr.to_owned(),
                path,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Accepts both bare `host:port` peers and full base URLs.
pub(super) fn endpoint_url(addr: &str, path: &str) -> String {
    let base = addr.trim().trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}{}", base, path)
    } else {
        format!("http://{}{}", base, path)
    }
}
