use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error};

use crate::error::HttpError;
use crate::metrics::{OutcomeRecord, RecordStore, TRANSPORT_ERROR_STATUS, now_unix_nanos};

use super::{DispatchParameters, execute_attempt};

const MAX_PREALLOCATED_RECORDS: usize = 1 << 16;

/// Everything the dispatch loop produced once its barrier has completed.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub records: Vec<OutcomeRecord>,
    /// Highest number of attempts observed running at the same time.
    pub peak_in_flight: usize,
    /// Time from the first pacing tick being armed until the last attempt finished.
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct InflightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InflightGauge {
    fn enter(&self) -> InflightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        InflightGuard { gauge: self }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InflightGuard<'gauge> {
    gauge: &'gauge InflightGauge,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Submits `total_attempts` GETs, one per pacing interval, round-robin over
/// `targets`, with at most `max_concurrency` attempts running at once.
///
/// Pacing and admission are independent: the interval decides when the next
/// attempt is submitted, the semaphore decides when it may start. Returns
/// only after every submitted attempt has finished, with exactly one record
/// per attempt.
///
/// # Errors
///
/// Returns an error when `targets` is empty.
pub async fn dispatch(
    client: &Client,
    targets: &[String],
    params: DispatchParameters,
    host_name: &str,
) -> Result<DispatchOutcome, HttpError> {
    if targets.is_empty() {
        return Err(HttpError::UrlListEmpty);
    }

    let total = usize::try_from(params.total_attempts).unwrap_or(usize::MAX);
    let period = params.pacing_interval();
    let timeout = params.per_request_timeout;
    let host_name: Arc<str> = Arc::from(host_name);
    let admission = Arc::new(Semaphore::new(params.max_concurrency.get()));
    let store = Arc::new(RecordStore::with_capacity(total.min(MAX_PREALLOCATED_RECORDS)));
    let gauge = Arc::new(InflightGauge::default());
    let mut tasks = JoinSet::new();
    let mut lost = 0usize;

    debug!(
        "Dispatching {} attempts every {:?} (max {} in flight)",
        total,
        period,
        params.max_concurrency.get()
    );

    let started = Instant::now();
    let first_tick = started.checked_add(period).unwrap_or(started);
    let mut pacing = interval_at(first_tick, period);
    pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for (_, url) in (0..total).zip(targets.iter().cycle()) {
        pacing.tick().await;
        let Ok(permit) = Arc::clone(&admission).acquire_owned().await else {
            break;
        };

        let client = client.clone();
        let url = url.clone();
        let host_name = Arc::clone(&host_name);
        let store = Arc::clone(&store);
        let gauge = Arc::clone(&gauge);
        tasks.spawn(async move {
            let record = {
                let _running = gauge.enter();
                execute_attempt(&client, &url, timeout, &host_name).await
            };
            store.push(record);
            drop(permit);
        });

        while let Some(result) = tasks.try_join_next() {
            lost = lost.saturating_add(count_lost(result));
        }
    }

    while let Some(result) = tasks.join_next().await {
        lost = lost.saturating_add(count_lost(result));
    }

    let mut records = store.take();
    records.extend((0..lost).map(|_| lost_attempt_record(&host_name)));

    Ok(DispatchOutcome {
        records,
        peak_in_flight: gauge.peak(),
        elapsed: started.elapsed(),
    })
}

fn count_lost(result: Result<(), tokio::task::JoinError>) -> usize {
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("Attempt task failed: {}", err);
            1
        }
    }
}

/// Stands in for an attempt whose task died before recording its outcome.
fn lost_attempt_record(host_name: &str) -> OutcomeRecord {
    let now = now_unix_nanos();
    OutcomeRecord {
        host_name: host_name.to_owned(),
        start_time: now,
        end_time: now,
        elapsed_millis: 0,
        status_code: TRANSPORT_ERROR_STATUS,
        message: "attempt task aborted".to_owned(),
        received_bytes: 0,
    }
}
