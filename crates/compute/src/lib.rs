pub mod catalog;
pub mod engine;
pub mod kernel;
pub mod scheduler;

pub use engine::{QuadratureEngine, RunReport};
pub use kernel::{evaluate, Evaluation, MIN_WIDTH};
pub use scheduler::{
    ForkJoinScheduler, Outcome, RunStats, Scheduler, SchedulerError, SharedQueueScheduler,
    WorkStealingScheduler, WorkerStats,
};
