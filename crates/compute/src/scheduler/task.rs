use subdivide_core::{CoreError, Integrand, Interval, Strategy};

use super::metrics::RunStats;

/// Error type for a scheduler run. Every variant aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("maximum queue size exceeded (capacity {capacity})")]
    QueueOverflow { capacity: usize },
    #[error("attempt to extract from empty queue")]
    EmptyQueue,
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("thread pool: {0}")]
    ThreadPool(String),
    #[error("failed to spawn worker {worker}: {reason}")]
    Spawn { worker: usize, reason: String },
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Value and statistics of one completed run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub value: f64,
    pub stats: RunStats,
}

/// A strategy for driving the kernel over a subdivision tree.
///
/// Implementations own no state between runs: queues, counters and the
/// abort flag are created per call to [`Scheduler::run`].
pub trait Scheduler: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Number of OS threads the run uses.
    fn workers(&self) -> usize;

    /// Integrate everything reachable from `seed` until no work remains.
    fn run(&self, f: &dyn Integrand, seed: Interval) -> Result<Outcome, SchedulerError>;
}
