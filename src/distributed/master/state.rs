use std::sync::atomic::{AtomicUsize, Ordering};

use crate::metrics::{OutcomeRecord, RecordStore};

/// What a single batch did to the run.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Stored; `remaining` slaves have yet to report.
    Pending { remaining: usize },
    /// This batch was the last one. Carries every collected record.
    Completed(Vec<OutcomeRecord>),
    /// Arrived after the run completed; dropped.
    Late,
}

/// Master-owned state for one run.
///
/// `pending` starts at the number of slaves and only ever decreases. The
/// batch whose decrement takes it from 1 to 0 is the only one that observes
/// completion.
#[derive(Debug)]
pub struct RunState {
    slave_addresses: Vec<String>,
    pending: AtomicUsize,
    records: RecordStore,
}

impl RunState {
    #[must_use]
    pub fn new(slave_addresses: Vec<String>) -> Self {
        let pending = AtomicUsize::new(slave_addresses.len());
        Self {
            slave_addresses,
            pending,
            records: RecordStore::new(),
        }
    }

    #[must_use]
    pub fn slave_addresses(&self) -> &[String] {
        &self.slave_addresses
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Stores a slave's batch and counts that slave as done.
    ///
    /// The decrement and the append happen under the store lock, so a batch
    /// that loses the race to the final one is neither counted nor stored.
    pub fn accept_batch(&self, batch: Vec<OutcomeRecord>) -> BatchOutcome {
        self.records.with_locked(|records| {
            match self
                .pending
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                    current.checked_sub(1)
                }) {
                Ok(previous) => {
                    records.extend(batch);
                    if previous == 1 {
                        BatchOutcome::Completed(std::mem::take(records))
                    } else {
                        BatchOutcome::Pending {
                            remaining: previous.saturating_sub(1),
                        }
                    }
                }
                Err(_) => BatchOutcome::Late,
            }
        })
    }

    /// Completes a run that has no slaves. Returns `None` when at least one
    /// report is expected; batches can never complete such a run, so this is
    /// the only trigger for it.
    #[must_use]
    pub fn complete_without_slaves(&self) -> Option<Vec<OutcomeRecord>> {
        if self.slave_addresses.is_empty() {
            Some(self.records.take())
        } else {
            None
        }
    }
}
