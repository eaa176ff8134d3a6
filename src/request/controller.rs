//! Request controller: one in-flight claim check at a time.
//!
//! Each [`RequestController::submit`] supersedes the previous attempt. The
//! blocking HTTP call runs on a worker thread; when it settles the worker
//! classifies the result and, only if the attempt is still the latest and
//! was not cancelled, hands the outcome to the emit callback.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use parking_lot::Mutex;

use super::outcome::{AttemptOutcome, classify};
use super::service::VerdictService;
use crate::core::claim::Claim;
use crate::core::errors::{DteError, Result};
use crate::core::generation::Generation;

/// Lifecycle of one request attempt. Leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Pending,
    Resolved,
    OutOfScope,
    Failed,
    Cancelled,
}

impl AttemptStatus {
    fn of(outcome: &AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::Resolved(_) => Self::Resolved,
            AttemptOutcome::OutOfScope(_) => Self::OutOfScope,
            AttemptOutcome::Failed(_) => Self::Failed,
        }
    }
}

/// Shared record of one attempt, written by whichever of the worker or a
/// cancel gets there first.
#[derive(Debug)]
struct AttemptRecord {
    generation: Generation,
    claim: Claim,
    status: Mutex<AttemptStatus>,
}

impl AttemptRecord {
    /// Move out of `Pending`. Returns `false` if already settled.
    fn settle(&self, status: AttemptStatus) -> bool {
        let mut current = self.status.lock();
        if *current != AttemptStatus::Pending {
            return false;
        }
        *current = status;
        true
    }

    fn status(&self) -> AttemptStatus {
        *self.status.lock()
    }
}

/// Issues claim checks and owns cancellation of superseded ones.
pub struct RequestController {
    service: Arc<dyn VerdictService>,
    latest: Arc<AtomicU64>,
    current: Option<Arc<AttemptRecord>>,
}

impl RequestController {
    #[must_use]
    pub fn new(service: Arc<dyn VerdictService>) -> Self {
        Self {
            service,
            latest: Arc::new(AtomicU64::new(0)),
            current: None,
        }
    }

    /// Start checking `claim`, cancelling any pending attempt first.
    ///
    /// `emit` runs on the worker thread, at most once, and never for an
    /// attempt that was cancelled or superseded before it settled.
    pub fn submit<F>(&mut self, claim: Claim, emit: F) -> Result<Generation>
    where
        F: FnOnce(Generation, AttemptOutcome) + Send + 'static,
    {
        self.cancel();

        let generation = Generation::new(self.latest.load(Ordering::Acquire)).next();
        self.latest.store(generation.get(), Ordering::Release);

        let record = Arc::new(AttemptRecord {
            generation,
            claim,
            status: Mutex::new(AttemptStatus::Pending),
        });
        self.current = Some(Arc::clone(&record));

        let service = Arc::clone(&self.service);
        let latest = Arc::clone(&self.latest);
        thread::Builder::new()
            .name(format!("dte-request-{generation}"))
            .spawn(move || {
                let settled = service.check_claim(&record.claim);
                let outcome = classify(settled);
                if latest.load(Ordering::Acquire) != record.generation.get() {
                    record.settle(AttemptStatus::Cancelled);
                    return;
                }
                if record.settle(AttemptStatus::of(&outcome)) {
                    emit(record.generation, outcome);
                }
            })
            .map_err(|e| DteError::Runtime {
                details: format!("failed to spawn request worker: {e}"),
            })?;

        Ok(generation)
    }

    /// Cancel the pending attempt, if any. Its eventual settlement is dropped.
    pub fn cancel(&mut self) {
        if let Some(record) = self.current.take() {
            record.settle(AttemptStatus::Cancelled);
        }
    }

    /// Generation of the most recent submission (zero before the first).
    #[must_use]
    pub fn latest_generation(&self) -> Generation {
        Generation::new(self.latest.load(Ordering::Acquire))
    }

    /// Status of the current attempt, `None` after cancel or before submit.
    #[must_use]
    pub fn current_status(&self) -> Option<(Generation, AttemptStatus)> {
        self.current
            .as_ref()
            .map(|record| (record.generation, record.status()))
    }
}

impl Drop for RequestController {
    fn drop(&mut self) {
        self.cancel();
    }
}
