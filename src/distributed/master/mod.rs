//! Coordinator side: broadcasts the start signal, collects one batch per
//! slave and aggregates once the last batch arrives.
mod collector;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::MasterConfig;
use crate::error::{AppError, AppResult, DistributedError, ValidationError};
use crate::http::load_targets;
use crate::metrics::{
    OutcomeRecord, RunSummary, print_summary, summarize, write_report, write_summary_json,
};

use super::client::ControlClient;
use super::protocol::{INIT_URLS_PATH, STRESS_PATH, WireDispatchParams};

pub use state::{BatchOutcome, RunState};

/// A master with its collection endpoint bound.
pub struct MasterNode {
    listener: TcpListener,
    config: MasterConfig,
}

impl MasterNode {
    /// # Errors
    ///
    /// Returns an error when the listen address cannot be bound.
    pub async fn bind(config: MasterConfig) -> AppResult<Self> {
        let listener = TcpListener::bind(&config.listen).await.map_err(|err| {
            AppError::distributed(DistributedError::Bind {
                addr: config.listen.clone(),
                source: err,
            })
        })?;
        Ok(Self::from_listener(listener, config))
    }

    /// Uses an already-bound listener; `config.listen` is ignored.
    #[must_use]
    pub const fn from_listener(listener: TcpListener, config: MasterConfig) -> Self {
        Self { listener, config }
    }

    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.listener.local_addr().map_err(|err| {
            AppError::distributed(DistributedError::Io {
                context: "read master listen address",
                source: err,
            })
        })
    }

    /// Runs one coordinated test and writes its report.
    ///
    /// With `send_urls`, the master's own target list is pushed to every slave
    /// first. Blocks until every slave has reported; a slave that never
    /// reports keeps the run waiting.
    ///
    /// # Errors
    ///
    /// Returns an error when setup fails or the report cannot be written.
    pub async fn run(self, send_urls: bool) -> AppResult<RunSummary> {
        let MasterNode { listener, config } = self;

        let seed_targets = if send_urls {
            let path = config
                .targets_path
                .as_deref()
                .ok_or(ValidationError::SendUrlsRequiresTargets)?;
            Some(load_targets(path).await?)
        } else {
            None
        };
        let client = ControlClient::new(config.control_timeout)?;

        let state = Arc::new(RunState::new(config.slaves.clone()));
        let (completion_tx, mut completion_rx) = mpsc::unbounded_channel();
        let collector = tokio::spawn(collector::accept_reports(
            listener,
            Arc::clone(&state),
            completion_tx,
        ));
        info!(
            "Master collecting on {} for {} slave(s)",
            config.listen,
            state.slave_addresses().len()
        );

        if let Some(targets) = seed_targets {
            broadcast(&client, state.slave_addresses(), INIT_URLS_PATH, &targets).await;
        }
        let params = WireDispatchParams::from(config.dispatch);
        let started = broadcast(&client, state.slave_addresses(), STRESS_PATH, &params).await;
        info!(
            "Start signal delivered to {}/{} slave(s)",
            started,
            state.slave_addresses().len()
        );

        let records = match state.complete_without_slaves() {
            Some(records) => {
                warn!("No slaves configured; aggregating an empty run");
                records
            }
            None => completion_rx.recv().await.ok_or_else(|| {
                AppError::distributed(DistributedError::Io {
                    context: "wait for slave reports",
                    source: std::io::Error::other("collection endpoint stopped"),
                })
            })?,
        };
        collector.abort();

        finalize(&config, &records).await
    }
}

/// Binds the master from `config`, runs one test and returns its summary.
///
/// # Errors
///
/// Returns an error when setup fails or the report cannot be written.
pub async fn run_master(config: MasterConfig, send_urls: bool) -> AppResult<RunSummary> {
    MasterNode::bind(config).await?.run(send_urls).await
}

/// Sends the same body to every slave at once. Failures are logged and not
/// retried. Returns how many slaves accepted.
async fn broadcast<T>(client: &ControlClient, slaves: &[String], path: &'static str, body: &T) -> usize
where
    T: serde::Serialize + Sync + ?Sized,
{
    let results = join_all(
        slaves
            .iter()
            .map(|addr| async move { (addr, client.post_json(addr, path, body).await) }),
    )
    .await;

    let mut delivered = 0usize;
    for (addr, result) in results {
        match result {
            Ok(()) => delivered = delivered.saturating_add(1),
            Err(err) => error!("Slave {} did not accept {}: {}", addr, path, err),
        }
    }
    delivered
}

async fn finalize(config: &MasterConfig, records: &[OutcomeRecord]) -> AppResult<RunSummary> {
    let summary = summarize(records);
    write_report(&config.report_path, records).await?;
    info!(
        "Wrote {} record(s) to {}",
        records.len(),
        config.report_path.display()
    );
    if let Some(path) = config.summary_path.as_deref() {
        write_summary_json(path, &summary).await?;
        info!("Wrote summary to {}", path.display());
    }
    print_summary(&summary);
    Ok(summary)
}
