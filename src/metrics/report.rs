use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::{AppError, AppResult, MetricsError};

use super::{OutcomeRecord, RunSummary};

const PERCENT_X100_FULL: u64 = 10_000;
const BPS_PER_MBPS_X100: u64 = 10_000;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// Writes one line per record: `hostName startTime endTime elapsedMillis statusCode`,
/// ordered by start time.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub async fn write_report(path: &Path, records: &[OutcomeRecord]) -> AppResult<()> {
    let mut ordered: Vec<&OutcomeRecord> = records.iter().collect();
    ordered.sort_by_key(|record| (record.start_time, record.end_time));

    let mut output = String::new();
    for record in ordered {
        writeln!(
            output,
            "{} {} {} {} {}",
            record.host_name,
            record.start_time,
            record.end_time,
            record.elapsed().as_millis(),
            record.status_code
        )
        .map_err(|err| AppError::metrics(MetricsError::WriteLine { source: err }))?;
    }
    write_file(path, output.as_bytes(), "report").await
}

/// Distinct failure descriptions, compared by exact text.
#[must_use]
pub fn distinct_errors(records: &[OutcomeRecord]) -> BTreeSet<String> {
    records.iter().filter_map(OutcomeRecord::error_key).collect()
}

/// Writes each distinct error on its own line. The file is truncated even
/// when there are no errors so it always reflects the latest run.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub async fn write_error_log(path: &Path, errors: &BTreeSet<String>) -> AppResult<()> {
    let mut output = String::new();
    for error in errors {
        writeln!(output, "{}", error)
            .map_err(|err| AppError::metrics(MetricsError::WriteLine { source: err }))?;
    }
    write_file(path, output.as_bytes(), "error log").await
}

/// Writes the summary as pretty JSON.
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub async fn write_summary_json(path: &Path, summary: &RunSummary) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(summary).map_err(|err| {
        AppError::metrics(MetricsError::Serialize {
            context: "summary export",
            source: err,
        })
    })?;
    write_file(path, &body, "summary").await
}

#[must_use]
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let success_x100 = if summary.total > 0 {
        PERCENT_X100_FULL.saturating_sub(summary.err_percent_x100)
    } else {
        0
    };
    let window_ms = summary
        .window_nanos
        .checked_div(NANOS_PER_MILLI)
        .unwrap_or(0);
    let mbps_x100 = summary
        .throughput_bps
        .checked_div(BPS_PER_MBPS_X100)
        .unwrap_or(0);

    let mut lines = vec![
        format!(
            "Window: {}.{:03}s",
            window_ms.checked_div(1000).unwrap_or(0),
            window_ms.checked_rem(1000).unwrap_or(0)
        ),
        format!("Total Requests: {}", summary.total),
        format!(
            "Successful: {} ({}%)",
            summary.ok_count,
            format_x100(success_x100)
        ),
        format!(
            "Errors: {} ({}%)",
            summary.err_count,
            format_x100(summary.err_percent_x100)
        ),
        format!("QPS: {}", summary.qps),
        format!(
            "Min/Max Latency (ok): {}ms / {}ms",
            summary.min_latency_ms, summary.max_latency_ms
        ),
        format!("Avg Latency (ok): {}ms", summary.avg_latency_ms),
        format!(
            "P50/P90/P99 Latency (ok): {}ms / {}ms / {}ms",
            summary.p50_latency_ms, summary.p90_latency_ms, summary.p99_latency_ms
        ),
        format!("Received: {} bytes", summary.received_bytes),
        format!("Throughput: {} Mbps", format_x100(mbps_x100)),
    ];

    if !summary.status_counts.is_empty() {
        let statuses = summary
            .status_counts
            .iter()
            .map(|(status, count)| format!("{}={}", status, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Status Codes: {}", statuses));
    }
    if !summary.error_breakdown.is_empty() {
        lines.push("Error Breakdown:".to_owned());
        for (error, count) in &summary.error_breakdown {
            lines.push(format!("  {:>6}  {}", count, error));
        }
    }
    lines
}

pub fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}

#[must_use]
pub fn format_x100(value: u64) -> String {
    format!(
        "{}.{:02}",
        value.checked_div(100).unwrap_or(0),
        value.checked_rem(100).unwrap_or(0)
    )
}

async fn write_file(path: &Path, contents: &[u8], context: &'static str) -> AppResult<()> {
    tokio::fs::write(path, contents).await.map_err(|err| {
        AppError::metrics(MetricsError::Write {
            context,
            path: path.to_path_buf(),
            source: err,
        })
    })
}
