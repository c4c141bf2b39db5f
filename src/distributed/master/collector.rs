use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::metrics::OutcomeRecord;

use super::super::http::{RouteError, read_http_request, write_error_response, write_json_response};
use super::super::protocol::{Ack, RESULT_PATH};
use super::state::{BatchOutcome, RunState};

pub(super) async fn accept_reports(
    listener: TcpListener,
    state: Arc<RunState>,
    completion_tx: mpsc::UnboundedSender<Vec<OutcomeRecord>>,
) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(result) => result,
            Err(err) => {
                warn!("Failed to accept report connection: {}", err);
                continue;
            }
        };
        debug!("Report connection from {}", peer);
        let state = Arc::clone(&state);
        let completion_tx = completion_tx.clone();
        tokio::spawn(async move {
            handle_report(socket, &state, &completion_tx).await;
        });
    }
}

async fn handle_report(
    mut socket: TcpStream,
    state: &RunState,
    completion_tx: &mpsc::UnboundedSender<Vec<OutcomeRecord>>,
) {
    let request = match read_http_request(&mut socket).await {
        Ok(request) => request,
        Err(err) => {
            reject(&mut socket, &err).await;
            return;
        }
    };
    if (request.method.as_str(), request.path.as_str()) != ("POST", RESULT_PATH) {
        reject(&mut socket, &RouteError::new(404, "Not found")).await;
        return;
    }

    let batch: Vec<OutcomeRecord> = match serde_json::from_slice(&request.body) {
        Ok(batch) => batch,
        Err(err) => {
            warn!("Rejected malformed result batch: {}", err);
            reject(
                &mut socket,
                &RouteError::new(400, format!("Invalid result batch: {}", err)),
            )
            .await;
            return;
        }
    };
    let batch_len = batch.len();

    let (ack, completed) = match state.accept_batch(batch) {
        BatchOutcome::Pending { remaining } => {
            info!(
                "Received {} record(s); waiting for {} more slave(s)",
                batch_len, remaining
            );
            (Ack::new("accepted"), None)
        }
        BatchOutcome::Completed(records) => {
            info!(
                "Received {} record(s); all slaves reported ({} total)",
                batch_len,
                records.len()
            );
            (Ack::new("accepted"), Some(records))
        }
        BatchOutcome::Late => {
            warn!(
                "Ignoring {} record(s) received after the run completed",
                batch_len
            );
            (Ack::new("ignored"), None)
        }
    };

    if let Err(err) = write_json_response(&mut socket, 200, &ack).await {
        error!("Failed to acknowledge result batch: {}", err);
    }
    drop(socket);

    if let Some(records) = completed
        && completion_tx.send(records).is_err()
    {
        error!("Run finished but the orchestrator is gone");
    }
}

async fn reject(socket: &mut TcpStream, err: &RouteError) {
    if let Err(write_err) = write_error_response(socket, err.status, &err.message).await {
        error!("Failed to write report response: {}", write_err);
    }
}
