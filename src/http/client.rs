use reqwest::{Client, redirect};

use crate::error::{AppError, AppResult, HttpError};

use super::DispatchParameters;

pub const DEFAULT_USER_AGENT: &str = concat!("webswarm/", env!("CARGO_PKG_VERSION"));

/// Builds the client shared by every attempt of one run.
///
/// # Errors
///
/// Returns an error if the TLS backend or client cannot be initialised.
pub fn build_attempt_client(params: &DispatchParameters) -> AppResult<Client> {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(params.per_request_timeout)
        .connect_timeout(params.per_request_timeout)
        .pool_max_idle_per_host(params.max_concurrency.get())
        .redirect(redirect::Policy::limited(10))
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
