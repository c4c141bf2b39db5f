use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status recorded when no HTTP response was received at all.
pub const TRANSPORT_ERROR_STATUS: i32 = -1;
/// The only status counted as a successful attempt.
pub const OK_STATUS: i32 = 200;

/// Result of one request attempt. Serialized as-is in the slave's report
/// batch, so field names follow the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub host_name: String,
    /// Unix timestamp in nanoseconds.
    pub start_time: i64,
    /// Unix timestamp in nanoseconds, never before `start_time`.
    pub end_time: i64,
    pub elapsed_millis: u64,
    pub status_code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub received_bytes: u64,
}

impl OutcomeRecord {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status_code == OK_STATUS
    }

    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        self.status_code == TRANSPORT_ERROR_STATUS
    }

    /// Wall-clock span of the attempt; a record with `end_time < start_time`
    /// counts as zero.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let nanos = self.end_time.saturating_sub(self.start_time);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
    }

    /// Key used to group failures: the transport error text, or
    /// `"<status>: <detail>"` for HTTP errors. `None` for successes.
    #[must_use]
    pub fn error_key(&self) -> Option<String> {
        if self.is_ok() {
            return None;
        }
        if self.is_transport_error() {
            return Some(self.message.clone());
        }
        Some(format!("{}: {}", self.status_code, self.message))
    }
}

/// Aggregates computed over an unordered set of outcome records.
///
/// Ratios are integers: `err_percent_x100` is hundredths of a percent and the
/// throughput is bits per second. Every field is 0 when its denominator (the
/// window or the ok count) is 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub start_time: i64,
    pub end_time: i64,
    pub window_nanos: u64,
    pub total: u64,
    pub ok_count: u64,
    pub err_count: u64,
    pub err_percent_x100: u64,
    pub qps: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub avg_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p90_latency_ms: u64,
    pub p99_latency_ms: u64,
    pub received_bytes: u64,
    pub throughput_bps: u64,
    pub status_counts: BTreeMap<i32, u64>,
    pub error_breakdown: BTreeMap<String, u64>,
}

impl RunSummary {
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_nanos(self.window_nanos)
    }
}

/// Current wall-clock time as Unix nanoseconds.
#[must_use]
pub fn now_unix_nanos() -> i64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or(i64::MAX)
}
