use std::collections::BTreeMap;

use tracing::warn;

use super::{LatencyHistogram, OutcomeRecord, RunSummary};

const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const PERCENT_X100_SCALE: u128 = 10_000;
const BITS_PER_BYTE: u128 = 8;

/// Reduces an unordered record set to run-level statistics.
///
/// The window runs from the earliest `start_time` to the latest `end_time`.
/// Latency figures only consider successful records. Empty input, a
/// zero-length window, or zero successes yield 0 for the affected fields.
#[must_use]
pub fn summarize(records: &[OutcomeRecord]) -> RunSummary {
    let Some(first) = records.first() else {
        return RunSummary::default();
    };

    let mut start_time = first.start_time;
    let mut end_time = first.end_time;
    let mut ok_count = 0u64;
    let mut received_bytes = 0u64;
    let mut latency_sum_nanos = 0u128;
    let mut min_latency_nanos = u128::MAX;
    let mut max_latency_nanos = 0u128;
    let mut status_counts: BTreeMap<i32, u64> = BTreeMap::new();
    let mut error_breakdown: BTreeMap<String, u64> = BTreeMap::new();
    let mut histogram = match LatencyHistogram::new() {
        Ok(histogram) => Some(histogram),
        Err(err) => {
            warn!("Latency percentiles disabled: {}", err);
            None
        }
    };

    for record in records {
        start_time = start_time.min(record.start_time);
        end_time = end_time.max(record.end_time);
        let count = status_counts.entry(record.status_code).or_insert(0);
        *count = count.saturating_add(1);

        if let Some(key) = record.error_key() {
            let count = error_breakdown.entry(key).or_insert(0);
            *count = count.saturating_add(1);
            continue;
        }

        ok_count = ok_count.saturating_add(1);
        received_bytes = received_bytes.saturating_add(record.received_bytes);
        let latency_nanos = record.elapsed().as_nanos();
        latency_sum_nanos = latency_sum_nanos.saturating_add(latency_nanos);
        min_latency_nanos = min_latency_nanos.min(latency_nanos);
        max_latency_nanos = max_latency_nanos.max(latency_nanos);
        let recorded = histogram
            .as_mut()
            .map(|hist| hist.record(nanos_to_millis(latency_nanos)));
        if let Some(Err(err)) = recorded {
            warn!("Dropping latency percentiles: {}", err);
            histogram = None;
        }
    }

    let total = u64::try_from(records.len()).unwrap_or(u64::MAX);
    let err_count = total.saturating_sub(ok_count);
    let window_nanos = u64::try_from(end_time.saturating_sub(start_time)).unwrap_or(0);
    let window = u128::from(window_nanos);

    let err_percent_x100 = ratio(
        u128::from(err_count).saturating_mul(PERCENT_X100_SCALE),
        u128::from(total),
    );
    let qps = ratio(
        u128::from(total).saturating_mul(NANOS_PER_SEC),
        window,
    );
    let throughput_bps = ratio(
        u128::from(received_bytes)
            .saturating_mul(BITS_PER_BYTE)
            .saturating_mul(NANOS_PER_SEC),
        window,
    );

    let (min_latency_ms, max_latency_ms, avg_latency_ms) = if ok_count > 0 {
        let avg_nanos = latency_sum_nanos
            .checked_div(u128::from(ok_count))
            .unwrap_or(0);
        (
            nanos_to_millis(min_latency_nanos),
            nanos_to_millis(max_latency_nanos),
            nanos_to_millis(avg_nanos),
        )
    } else {
        (0, 0, 0)
    };
    let (p50_latency_ms, p90_latency_ms, p99_latency_ms) = histogram
        .as_ref()
        .map_or((0, 0, 0), LatencyHistogram::percentiles);

    RunSummary {
        start_time,
        end_time,
        window_nanos,
        total,
        ok_count,
        err_count,
        err_percent_x100,
        qps,
        min_latency_ms,
        max_latency_ms,
        avg_latency_ms,
        p50_latency_ms,
        p90_latency_ms,
        p99_latency_ms,
        received_bytes,
        throughput_bps,
        status_counts,
        error_breakdown,
    }
}

fn ratio(numerator: u128, denominator: u128) -> u64 {
    let value = numerator.checked_div(denominator).unwrap_or(0);
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn nanos_to_millis(nanos: u128) -> u64 {
    ratio(nanos, NANOS_PER_MILLI)
}
