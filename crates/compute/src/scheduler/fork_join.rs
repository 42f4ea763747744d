//! Structured recursive parallelism on a rayon pool.
//!
//! A split spawns one subtask per child with `rayon::join` and returns their
//! sum once both finish. Completion is structural, so no termination
//! detection is involved.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use subdivide_core::{Integrand, Interval, Strategy};
use tracing::info;

use super::metrics::RunStats;
use super::task::{Outcome, Scheduler, SchedulerError};
use crate::kernel::{self, Evaluation};

pub struct ForkJoinScheduler {
    workers: usize,
}

impl ForkJoinScheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

#[derive(Default)]
struct Counters {
    evaluations: AtomicU64,
    accepted: AtomicU64,
    splits: AtomicU64,
}

impl Scheduler for ForkJoinScheduler {
    fn strategy(&self) -> Strategy {
        Strategy::ForkJoin
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn run(&self, f: &dyn Integrand, seed: Interval) -> Result<Outcome, SchedulerError> {
        let start = Instant::now();
        info!("Fork-join run starting with {} workers", self.workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("fj-worker-{i}"))
            .build()
            .map_err(|e| SchedulerError::ThreadPool(e.to_string()))?;

        let counters = Counters::default();
        // One root invocation; every further task comes from nested joins.
        let value = pool.install(|| subdivide(f, seed, &counters));

        let stats = RunStats {
            evaluations: counters.evaluations.into_inner(),
            accepted: counters.accepted.into_inner(),
            splits: counters.splits.into_inner(),
            ..Default::default()
        };

        info!(
            "Fork-join run done in {:.3}s: value={:e}, evaluations={}",
            start.elapsed().as_secs_f64(),
            value,
            stats.evaluations
        );
        Ok(Outcome { value, stats })
    }
}

fn subdivide(f: &dyn Integrand, task: Interval, counters: &Counters) -> f64 {
    counters.evaluations.fetch_add(1, Ordering::Relaxed);
    match kernel::evaluate(f, &task) {
        Evaluation::Accept(value) => {
            counters.accepted.fetch_add(1, Ordering::Relaxed);
            value
        }
        Evaluation::Split(left, right) => {
            counters.splits.fetch_add(1, Ordering::Relaxed);
            let (a, b) = rayon::join(
                || subdivide(f, left, counters),
                || subdivide(f, right, counters),
            );
            a + b
        }
    }
}
