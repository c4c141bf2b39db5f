use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::http::DispatchParameters;

/// Slave route that replaces the target list.
pub const INIT_URLS_PATH: &str = "/initUrls";
/// Slave route that starts a run.
pub const STRESS_PATH: &str = "/stress";
/// Master route that accepts a slave's record batch.
pub const RESULT_PATH: &str = "/result";

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Start-run body. Older masters send `nPerSecond`/`total`/`parallel` and no
/// timeout; both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDispatchParams {
    #[serde(alias = "nPerSecond")]
    pub rate_per_second: u64,
    #[serde(alias = "total")]
    pub total_attempts: u64,
    #[serde(alias = "parallel")]
    pub max_concurrency: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl From<DispatchParameters> for WireDispatchParams {
    fn from(params: DispatchParameters) -> Self {
        Self {
            rate_per_second: params.rate_per_second.get(),
            total_attempts: params.total_attempts,
            max_concurrency: u64::try_from(params.max_concurrency.get()).unwrap_or(u64::MAX),
            timeout_seconds: params.per_request_timeout.as_secs().max(1),
        }
    }
}

impl TryFrom<WireDispatchParams> for DispatchParameters {
    type Error = ValidationError;

    fn try_from(wire: WireDispatchParams) -> Result<Self, Self::Error> {
        Self::from_raw(
            wire.rate_per_second,
            wire.total_attempts,
            wire.max_concurrency,
            wire.timeout_seconds,
        )
    }
}

/// Body of every successful control-plane response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
}

impl Ack {
    pub(crate) fn new(status: &str) -> Self {
        Self {
            status: status.to_owned(),
        }
    }
}
