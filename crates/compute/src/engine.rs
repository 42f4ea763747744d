use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use subdivide_core::{Integrand, Interval, SchedulerConfig, Strategy};
use tracing::info;

use crate::scheduler::{self, RunStats, Scheduler, SchedulerError};

/// Everything known about one finished integration.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub strategy: Strategy,
    pub workers: usize,
    pub value: f64,
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
    pub stats: RunStats,
}

/// Seeds a run, hands it to the configured scheduler and times it.
pub struct QuadratureEngine {
    scheduler: Box<dyn Scheduler>,
}

impl QuadratureEngine {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            scheduler: scheduler::build(config),
        }
    }

    /// Use an already-built scheduler.
    pub fn with_scheduler(scheduler: Box<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    pub fn strategy(&self) -> Strategy {
        self.scheduler.strategy()
    }

    /// Integrate `f` over `[left, right]` with per-interval tolerance `tol`.
    pub fn integrate(
        &self,
        f: &dyn Integrand,
        left: f64,
        right: f64,
        tol: f64,
    ) -> Result<RunReport, SchedulerError> {
        let started_at = Utc::now();
        let start = Instant::now();

        let seed = Interval::seed(f, left, right, tol)?;
        let outcome = self.scheduler.run(f, seed)?;
        let elapsed = start.elapsed();

        info!(
            "Integrated [{}, {}] with {} x{} in {:.3}s: {:e} ({} intervals accepted)",
            left,
            right,
            self.scheduler.strategy(),
            self.scheduler.workers(),
            elapsed.as_secs_f64(),
            outcome.value,
            outcome.stats.accepted
        );

        Ok(RunReport {
            strategy: self.scheduler.strategy(),
            workers: self.scheduler.workers(),
            value: outcome.value,
            elapsed,
            started_at,
            stats: outcome.stats,
        })
    }
}
