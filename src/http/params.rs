use std::time::Duration;

use crate::args::{PositiveU64, PositiveUsize};
use crate::error::ValidationError;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Per-run settings a slave receives with the start signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchParameters {
    pub rate_per_second: PositiveU64,
    pub total_attempts: u64,
    pub max_concurrency: PositiveUsize,
    pub per_request_timeout: Duration,
}

impl DispatchParameters {
    /// Validates raw numbers as they appear in config files and on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error when the rate, concurrency, or timeout is zero.
    pub fn from_raw(
        rate_per_second: u64,
        total_attempts: u64,
        max_concurrency: u64,
        timeout_seconds: u64,
    ) -> Result<Self, ValidationError> {
        let rate_per_second = PositiveU64::try_from(rate_per_second).map_err(|_err| {
            ValidationError::DispatchFieldTooSmall {
                field: "ratePerSecond",
            }
        })?;
        let max_concurrency =
            PositiveUsize::try_from(usize::try_from(max_concurrency).unwrap_or(usize::MAX))
                .map_err(|_err| ValidationError::DispatchFieldTooSmall {
                    field: "maxConcurrency",
                })?;
        if timeout_seconds == 0 {
            return Err(ValidationError::DispatchFieldTooSmall {
                field: "timeoutSeconds",
            });
        }

        Ok(Self {
            rate_per_second,
            total_attempts,
            max_concurrency,
            per_request_timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// Fixed delay between two submissions: one second divided by the rate,
    /// never shorter than one nanosecond.
    #[must_use]
    pub const fn pacing_interval(&self) -> Duration {
        let nanos = match NANOS_PER_SEC.checked_div(self.rate_per_second.get()) {
            Some(0) | None => 1,
            Some(nanos) => nanos,
        };
        Duration::from_nanos(nanos)
    }
}
