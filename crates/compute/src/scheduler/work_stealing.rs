//! One LIFO queue per worker; idle workers steal from peers round-robin.
//!
//! Children of a split always go to the splitting worker's own queue, so a
//! worker only stops once its own queue is empty and nothing is in flight
//! anywhere. An empty own queue alone is not enough: another worker may be
//! mid-split and about to produce work that could be stolen.

use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use crossbeam_utils::Backoff;
use subdivide_core::{Integrand, Interval, Strategy};
use tracing::{debug, info, trace};

use super::metrics::{RunStats, WorkerStats};
use super::queue::{lock, try_lock, LockedQueue, TaskQueue};
use super::task::{Outcome, Scheduler, SchedulerError};
use super::termination::TerminationDetector;
use super::worker::{drive_guarded, Tally};

pub struct WorkStealingScheduler {
    workers: usize,
    queue_capacity: usize,
}

impl WorkStealingScheduler {
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity,
        }
    }
}

impl Scheduler for WorkStealingScheduler {
    fn strategy(&self) -> Strategy {
        Strategy::WorkStealing
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn run(&self, f: &dyn Integrand, seed: Interval) -> Result<Outcome, SchedulerError> {
        let start = Instant::now();
        info!(
            "Work-stealing run starting with {} workers (queue capacity {})",
            self.workers, self.queue_capacity
        );

        let queues: Vec<LockedQueue> = (0..self.workers)
            .map(|_| Mutex::new(TaskQueue::with_capacity(self.queue_capacity)))
            .collect();
        lock(&queues[0])?.enqueue(seed)?;

        let detector = TerminationDetector::new();

        let tallies: Vec<WorkerStats> = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            for id in 0..self.workers {
                let worker = StealingWorker {
                    id,
                    f,
                    queues: &queues,
                    detector: &detector,
                };
                let spawned = thread::Builder::new()
                    .name(format!("ws-worker-{id}"))
                    .spawn_scoped(scope, move || worker.run());
                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        detector.abort(SchedulerError::Spawn {
                            worker: id,
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }

            // Partial sums are only read once every worker has left its loop.
            let mut tallies = Vec::with_capacity(handles.len());
            for (id, handle) in handles {
                match handle.join() {
                    Ok(stats) => tallies.push(stats),
                    Err(_) => detector.abort(SchedulerError::WorkerPanicked(id)),
                }
            }
            tallies
        });

        let active_at_exit = detector.active();
        if let Some(err) = detector.into_failure() {
            return Err(err);
        }

        let mut stats = RunStats {
            active_at_exit,
            ..Default::default()
        };
        for queue in queues {
            let queue = queue
                .into_inner()
                .map_err(|e| SchedulerError::LockPoisoned(format!("task queue lock: {}", e)))?;
            stats.max_queue_depth = stats.max_queue_depth.max(queue.high_water());
        }
        for tally in tallies {
            stats.record_worker(tally);
        }
        let value = stats.combined_partial_sums();

        info!(
            "Work-stealing run done in {:.3}s: value={:e}, evaluations={}, steals={}",
            start.elapsed().as_secs_f64(),
            value,
            stats.evaluations,
            stats.steals
        );
        Ok(Outcome { value, stats })
    }
}

struct StealingWorker<'a> {
    id: usize,
    f: &'a dyn Integrand,
    queues: &'a [LockedQueue],
    detector: &'a TerminationDetector,
}

impl StealingWorker<'_> {
    fn run(self) -> WorkerStats {
        let mut tally = Tally::new(self.id);
        drive_guarded(self.id, self.detector, &mut tally, |tally| self.drive(tally));
        let stats = tally.into_stats();
        debug!(
            worker = self.id,
            evaluations = stats.evaluations,
            accepted = stats.accepted,
            steals = stats.steals,
            "work-stealing worker exiting"
        );
        stats
    }

    fn drive(&self, tally: &mut Tally) -> Result<(), SchedulerError> {
        let backoff = Backoff::new();
        loop {
            if self.detector.is_aborted() {
                return Ok(());
            }

            let task = match self.take_own()? {
                Some(task) => Some(task),
                None => self.steal(tally)?,
            };

            match task {
                Some(task) => {
                    backoff.reset();
                    if let Some((left, right)) = tally.process(self.f, &task) {
                        let mut own = lock(&self.queues[self.id])?;
                        own.enqueue(left)?;
                        own.enqueue(right)?;
                    }
                    // Only after the children are visible to thieves.
                    self.detector.finish();
                }
                None => {
                    let own_empty = lock(&self.queues[self.id])?.is_empty();
                    if self.detector.is_complete(own_empty) {
                        return Ok(());
                    }
                    backoff.snooze();
                }
            }
        }
    }

    fn take_own(&self) -> Result<Option<Interval>, SchedulerError> {
        let mut own = lock(&self.queues[self.id])?;
        if own.is_empty() {
            return Ok(None);
        }
        let task = own.dequeue()?;
        self.detector.begin();
        Ok(Some(task))
    }

    /// Try each peer once, starting at the next worker. Locked peers are skipped.
    fn steal(&self, tally: &mut Tally) -> Result<Option<Interval>, SchedulerError> {
        let n = self.queues.len();
        for offset in 1..n {
            let victim = (self.id + offset) % n;
            let Some(mut queue) = try_lock(&self.queues[victim])? else {
                continue;
            };
            if queue.is_empty() {
                continue;
            }
            let task = queue.dequeue()?;
            self.detector.begin();
            drop(queue);

            tally.record_steal();
            trace!(worker = self.id, victim, "stole task");
            return Ok(Some(task));
        }
        Ok(None)
    }
}
