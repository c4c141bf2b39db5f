use std::sync::{Mutex, MutexGuard, PoisonError};

use super::OutcomeRecord;

/// Append-only record set shared between concurrent producers.
///
/// Every mutation takes the lock for the duration of a single append; reads
/// happen once producers are done. `with_locked` lets a caller pair an append
/// with other bookkeeping under the same lock.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Mutex<Vec<OutcomeRecord>>,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn push(&self, record: OutcomeRecord) {
        self.lock().push(record);
    }

    pub fn extend(&self, batch: Vec<OutcomeRecord>) {
        self.lock().extend(batch);
    }

    /// Moves every record out, leaving the store empty.
    #[must_use]
    pub fn take(&self) -> Vec<OutcomeRecord> {
        std::mem::take(&mut *self.lock())
    }

    /// Runs `f` with the record set locked.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut Vec<OutcomeRecord>) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OutcomeRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
