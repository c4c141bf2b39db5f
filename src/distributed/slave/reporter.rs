use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::AppResult;
use crate::http::{build_attempt_client, dispatch};
use crate::metrics::{
    OutcomeRecord, distinct_errors, format_x100, print_summary, summarize, write_error_log,
};

use super::super::client::ControlClient;
use super::super::protocol::RESULT_PATH;
use super::state::RunTicket;

/// Delivers a finished run's records to the collector.
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the batch could not be delivered.
    async fn deliver(&self, records: &[OutcomeRecord]) -> AppResult<()>;
}

/// Posts the batch to the master's `/result` endpoint.
#[derive(Debug, Clone)]
pub struct HttpReportTransport {
    client: ControlClient,
    master: String,
}

impl HttpReportTransport {
    #[must_use]
    pub const fn new(client: ControlClient, master: String) -> Self {
        Self { client, master }
    }
}

#[async_trait]
impl ReportTransport for HttpReportTransport {
    async fn deliver(&self, records: &[OutcomeRecord]) -> AppResult<()> {
        self.client
            .post_json(&self.master, RESULT_PATH, records)
            .await?;
        Ok(())
    }
}

/// Where a slave puts the output of a run.
pub(super) struct RunSinks {
    pub(super) host_name: String,
    pub(super) error_log_path: PathBuf,
    pub(super) transport: Arc<dyn ReportTransport>,
}

/// Dispatches one run, logs the local summary, writes the error log and
/// hands the batch to the transport. Nothing here is fatal to the slave.
pub(super) async fn execute_run(ticket: RunTicket, sinks: &RunSinks) {
    let RunTicket {
        params,
        targets,
        guard: _guard,
    } = ticket;

    info!(
        "Run started: {} attempts at {}/s over {} target(s), max {} in flight",
        params.total_attempts,
        params.rate_per_second.get(),
        targets.len(),
        params.max_concurrency.get()
    );

    let records = match build_attempt_client(&params) {
        Ok(client) => match dispatch(&client, &targets, params, &sinks.host_name).await {
            Ok(outcome) => {
                info!(
                    "Dispatch finished in {:?} (peak {} in flight)",
                    outcome.elapsed, outcome.peak_in_flight
                );
                outcome.records
            }
            Err(err) => {
                error!("Dispatch failed: {}", err);
                Vec::new()
            }
        },
        Err(err) => {
            error!("Failed to prepare attempt client: {}", err);
            Vec::new()
        }
    };

    let summary = summarize(&records);
    info!(
        "Local summary: total={} ok={} err={} ({}%) qps={}",
        summary.total,
        summary.ok_count,
        summary.err_count,
        format_x100(summary.err_percent_x100),
        summary.qps
    );
    print_summary(&summary);

    let errors = distinct_errors(&records);
    if let Err(err) = write_error_log(&sinks.error_log_path, &errors).await {
        warn!("{}", err);
    } else if !errors.is_empty() {
        info!(
            "Wrote {} distinct error(s) to {}",
            errors.len(),
            sinks.error_log_path.display()
        );
    }

    match sinks.transport.deliver(&records).await {
        Ok(()) => info!("Delivered {} record(s)", records.len()),
        Err(err) => error!("Failed to deliver results: {}", err),
    }
}
