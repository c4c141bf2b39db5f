use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ValidationError;
use crate::http::{DispatchParameters, validate_targets};

use super::super::http::RouteError;
use super::super::protocol::WireDispatchParams;

/// Everything a slave's request handlers share.
#[derive(Debug)]
pub(super) struct SlaveState {
    targets: Mutex<Arc<[String]>>,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when a run ends, however it ends.
#[derive(Debug)]
pub(super) struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// An accepted start request, ready to be dispatched.
#[derive(Debug)]
pub(super) struct RunTicket {
    pub(super) params: DispatchParameters,
    pub(super) targets: Arc<[String]>,
    pub(super) guard: RunGuard,
}

impl SlaveState {
    pub(super) fn new(targets: Vec<String>) -> Self {
        Self {
            targets: Mutex::new(targets.into()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(super) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(super) fn target_count(&self) -> usize {
        self.lock_targets().len()
    }

    /// Replaces the target list with a posted one.
    pub(super) fn replace_targets(&self, body: &[u8]) -> Result<usize, RouteError> {
        let urls: Vec<String> = serde_json::from_slice(body)
            .map_err(|err| RouteError::new(400, format!("Invalid URL list: {}", err)))?;
        let urls = urls
            .into_iter()
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .collect();
        let urls = validate_targets(urls).map_err(|err| RouteError::new(400, err.to_string()))?;

        let mut targets = self.lock_targets();
        if self.is_running() {
            return Err(RouteError::new(409, "A run is already in progress"));
        }
        let count = urls.len();
        *targets = urls.into();
        Ok(count)
    }

    /// Validates a start request and marks the slave busy.
    pub(super) fn begin_run(&self, body: &[u8]) -> Result<RunTicket, RouteError> {
        let wire: WireDispatchParams = serde_json::from_slice(body)
            .map_err(|err| RouteError::new(400, format!("Invalid dispatch parameters: {}", err)))?;
        let params = DispatchParameters::try_from(wire)
            .map_err(|err: ValidationError| RouteError::new(400, err.to_string()))?;

        let targets = self.lock_targets();
        if targets.is_empty() {
            return Err(RouteError::new(409, "No targets loaded"));
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RouteError::new(409, "A run is already in progress"));
        }
        Ok(RunTicket {
            params,
            targets: Arc::clone(&*targets),
            guard: RunGuard {
                running: Arc::clone(&self.running),
            },
        })
    }

    fn lock_targets(&self) -> MutexGuard<'_, Arc<[String]>> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
