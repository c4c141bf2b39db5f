use std::error::Error as _;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tokio::time::Instant;

use crate::metrics::{OK_STATUS, OutcomeRecord, TRANSPORT_ERROR_STATUS, now_unix_nanos};

/// Upper bound on how much of a non-200 body ends up in the record message.
const MAX_ERROR_BODY_BYTES: usize = 256;

/// Issues one GET and classifies the result. Never fails: transport errors
/// become `statusCode = -1` records carrying the error text.
pub async fn execute_attempt(
    client: &Client,
    url: &str,
    timeout: Duration,
    host_name: &str,
) -> OutcomeRecord {
    let start_time = now_unix_nanos();
    let started = Instant::now();

    let (status_code, message, received_bytes) = match client.get(url).timeout(timeout).send().await
    {
        Ok(response) if response.status() == StatusCode::OK => {
            match drain_response_body(response).await {
                Ok(bytes) => (OK_STATUS, status_text(StatusCode::OK), bytes),
                Err(err) => (TRANSPORT_ERROR_STATUS, describe_error(&err), 0),
            }
        }
        Ok(response) => {
            let status = response.status();
            let detail = read_error_detail(response).await;
            let message = if detail.is_empty() {
                status_text(status)
            } else {
                format!("{}: {}", status_text(status), detail)
            };
            (i32::from(status.as_u16()), message, 0)
        }
        Err(err) => (TRANSPORT_ERROR_STATUS, describe_error(&err), 0),
    };

    let elapsed = started.elapsed();
    let elapsed_nanos = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
    OutcomeRecord {
        host_name: host_name.to_owned(),
        start_time,
        end_time: start_time.saturating_add(elapsed_nanos),
        elapsed_millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        status_code,
        message,
        received_bytes,
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_u16().to_string(), str::to_owned)
}

/// Flattens an error and its source chain into a single line.
fn describe_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    single_line(&message)
}

async fn drain_response_body(response: Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

async fn read_error_detail(response: Response) -> String {
    let mut stream = response.bytes_stream();
    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let Ok(bytes) = chunk else {
            break;
        };
        let room = MAX_ERROR_BODY_BYTES.saturating_sub(body.len());
        body.extend(bytes.iter().take(room));
        if body.len() >= MAX_ERROR_BODY_BYTES {
            break;
        }
    }
    single_line(&String::from_utf8_lossy(&body))
}

/// Collapses all whitespace runs so one message always fits one log line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
