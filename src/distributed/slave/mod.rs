//! Worker side: accepts target lists and start signals, runs the dispatcher
//! and reports the batch back to the master.
mod host;
mod reporter;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::SlaveConfig;
use crate::error::{AppError, AppResult, DistributedError};
use crate::http::load_targets;

use super::client::ControlClient;
use super::http::{RouteError, read_http_request, write_error_response, write_json_response};
use super::protocol::{Ack, INIT_URLS_PATH, STRESS_PATH};

pub use reporter::{HttpReportTransport, ReportTransport};

use reporter::{RunSinks, execute_run};
use state::SlaveState;

/// A bound slave listener, ready to serve.
pub struct SlaveNode {
    listener: TcpListener,
    state: Arc<SlaveState>,
    sinks: Arc<RunSinks>,
}

impl SlaveNode {
    /// Loads the configured target list and binds the listen address.
    /// Results are posted to the configured master.
    ///
    /// # Errors
    ///
    /// Returns an error when the target file is unusable or the address
    /// cannot be bound.
    pub async fn bind(config: SlaveConfig) -> AppResult<Self> {
        let client = ControlClient::new(config.control_timeout)?;
        let transport = Arc::new(HttpReportTransport::new(client, config.master.clone()));
        Self::bind_with_transport(config, transport).await
    }

    /// Like [`SlaveNode::bind`], delivering results through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error when the target file is unusable or the address
    /// cannot be bound.
    pub async fn bind_with_transport(
        config: SlaveConfig,
        transport: Arc<dyn ReportTransport>,
    ) -> AppResult<Self> {
        let targets = match config.targets_path.as_deref() {
            Some(path) => {
                let targets = load_targets(path).await?;
                info!("Loaded {} target(s) from {}", targets.len(), path.display());
                targets
            }
            None => {
                info!("No target file configured; waiting for {}", INIT_URLS_PATH);
                Vec::new()
            }
        };

        let listener = TcpListener::bind(&config.listen).await.map_err(|err| {
            AppError::distributed(DistributedError::Bind {
                addr: config.listen.clone(),
                source: err,
            })
        })?;
        let host_name = host::resolve_host_name(config.host_name.as_deref(), &config.listen);

        Ok(Self {
            listener,
            state: Arc::new(SlaveState::new(targets)),
            sinks: Arc::new(RunSinks {
                host_name,
                error_log_path: config.error_log_path,
                transport,
            }),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.listener.local_addr().map_err(|err| {
            AppError::distributed(DistributedError::Io {
                context: "read slave listen address",
                source: err,
            })
        })
    }

    /// Serves control requests until the process exits.
    pub async fn serve(self) {
        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(result) => result,
                Err(err) => {
                    warn!("Failed to accept control connection: {}", err);
                    continue;
                }
            };
            debug!("Control connection from {}", peer);
            let state = Arc::clone(&self.state);
            let sinks = Arc::clone(&self.sinks);
            tokio::spawn(async move {
                handle_connection(socket, state, sinks).await;
            });
        }
    }
}

/// Binds the slave from `config` and serves forever.
///
/// # Errors
///
/// Returns an error when startup fails.
pub async fn run_slave(config: SlaveConfig) -> AppResult<()> {
    let node = SlaveNode::bind(config).await?;
    info!(
        "Slave {} listening on {}",
        node.sinks.host_name,
        node.local_addr()?
    );
    node.serve().await;
    Ok(())
}

async fn handle_connection(mut socket: TcpStream, state: Arc<SlaveState>, sinks: Arc<RunSinks>) {
    let request = match read_http_request(&mut socket).await {
        Ok(request) => request,
        Err(err) => {
            reject(&mut socket, &err).await;
            return;
        }
    };

    match (request.method.as_str(), request.path.as_str()) {
        ("POST", INIT_URLS_PATH) => match state.replace_targets(&request.body) {
            Ok(count) => {
                info!("Target list replaced ({} URL(s))", count);
                respond_ok(&mut socket, "targets loaded").await;
            }
            Err(err) => {
                warn!("Rejected {}: {}", INIT_URLS_PATH, err.message);
                reject(&mut socket, &err).await;
            }
        },
        ("POST", STRESS_PATH) => match state.begin_run(&request.body) {
            Ok(ticket) => {
                respond_ok(&mut socket, "started").await;
                drop(socket);
                tokio::spawn(async move {
                    execute_run(ticket, &sinks).await;
                });
            }
            Err(err) => {
                warn!(
                    "Rejected {} ({} target(s) loaded): {}",
                    STRESS_PATH,
                    state.target_count(),
                    err.message
                );
                reject(&mut socket, &err).await;
            }
        },
        _ => reject(&mut socket, &RouteError::new(404, "Not found")).await,
    }
}

async fn respond_ok(socket: &mut TcpStream, status: &str) {
    if let Err(err) = write_json_response(socket, 200, &Ack::new(status)).await {
        error!("Failed to write control response: {}", err);
    }
}

async fn reject(socket: &mut TcpStream, err: &RouteError) {
    if let Err(write_err) = write_error_response(socket, err.status, &err.message).await {
        error!("Failed to write control response: {}", write_err);
    }
}
