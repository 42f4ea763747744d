//! Termination detection for the queue-based schedulers.
//!
//! A run is complete when every queue is empty and no task is in flight.
//! "In flight" means dequeued but not yet resolved into an accepted
//! contribution or two enqueued children. The protocol is only sound if
//! [`TerminationDetector::begin`] runs before the dequeuing lock is released
//! and [`TerminationDetector::finish`] runs after the children are enqueued.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::error;

use super::task::SchedulerError;

/// Per-run in-flight counter plus the abort state of the run.
#[derive(Debug, Default)]
pub struct TerminationDetector {
    active: AtomicUsize,
    aborted: AtomicBool,
    failure: Mutex<Option<SchedulerError>>,
}

impl TerminationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A task was dequeued for processing.
    pub fn begin(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    /// A task was fully resolved.
    pub fn finish(&self) {
        let previous = self.active.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "active task counter went negative");
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// No task is in flight anywhere.
    pub fn is_quiescent(&self) -> bool {
        self.active() == 0
    }

    /// Completion test for one worker: the queue(s) it must drain are empty
    /// and nothing is in flight.
    pub fn is_complete(&self, queue_empty: bool) -> bool {
        queue_empty && self.is_quiescent()
    }

    /// Abort the run. The first failure is kept; later ones are dropped.
    pub fn abort(&self, err: SchedulerError) {
        error!("Aborting run: {}", err);
        if let Ok(mut slot) = self.failure.lock() {
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Take the recorded failure, if the run was aborted.
    pub fn into_failure(self) -> Option<SchedulerError> {
        let aborted = self.aborted.into_inner();
        let failure = match self.failure.into_inner() {
            Ok(failure) => failure,
            Err(poisoned) => poisoned.into_inner(),
        };
        match failure {
            Some(err) => Some(err),
            None if aborted => Some(SchedulerError::LockPoisoned(
                "failure slot poisoned during abort".to_string(),
            )),
            None => None,
        }
    }
}
