//! Interchangeable schedulers over the subdivision kernel.
//!
//! Three strategies drive the same [`crate::kernel::evaluate`]:
//! - `fork_join`: recursive spawn/join on a rayon pool
//! - `work_stealing`: per-worker LIFO queues, round-robin stealing
//! - `shared_queue`: one queue and one lock for all workers
//!
//! The two queue-based strategies share the bounded [`TaskQueue`] and the
//! [`TerminationDetector`].

pub mod fork_join;
pub mod metrics;
pub mod queue;
pub mod shared_queue;
pub mod task;
pub mod termination;
pub mod work_stealing;
mod worker;

use subdivide_core::{SchedulerConfig, Strategy};

pub use fork_join::ForkJoinScheduler;
pub use metrics::{RunStats, WorkerStats};
pub use queue::{LockedQueue, TaskQueue};
pub use shared_queue::SharedQueueScheduler;
pub use task::{Outcome, Scheduler, SchedulerError};
pub use termination::TerminationDetector;
pub use work_stealing::WorkStealingScheduler;

/// Build the scheduler selected by `config.strategy`.
pub fn build(config: &SchedulerConfig) -> Box<dyn Scheduler> {
    let workers = config.resolved_worker_threads();
    match config.strategy {
        Strategy::ForkJoin => Box::new(ForkJoinScheduler::new(workers)),
        Strategy::WorkStealing => Box::new(WorkStealingScheduler::new(workers, config.queue_capacity)),
        Strategy::SharedQueue => Box::new(SharedQueueScheduler::new(workers, config.queue_capacity)),
    }
}

#[cfg(test)]
mod tests;
