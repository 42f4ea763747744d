//! Every worker pulls from, and pushes to, one queue behind one lock.
//!
//! Dequeue, the in-flight increment and the completion test happen in the
//! same critical section. Testing "empty" outside it would let two workers
//! both see an empty queue while a third is about to enqueue children.

use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use crossbeam_utils::Backoff;
use subdivide_core::{Integrand, Interval, Strategy};
use tracing::{debug, info};

use super::metrics::{RunStats, WorkerStats};
use super::queue::{lock, LockedQueue, TaskQueue};
use super::task::{Outcome, Scheduler, SchedulerError};
use super::termination::TerminationDetector;
use super::worker::{drive_guarded, Tally};

pub struct SharedQueueScheduler {
    workers: usize,
    queue_capacity: usize,
}

impl SharedQueueScheduler {
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity,
        }
    }
}

impl Scheduler for SharedQueueScheduler {
    fn strategy(&self) -> Strategy {
        Strategy::SharedQueue
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn run(&self, f: &dyn Integrand, seed: Interval) -> Result<Outcome, SchedulerError> {
        let start = Instant::now();
        info!(
            "Shared-queue run starting with {} workers (queue capacity {})",
            self.workers, self.queue_capacity
        );

        let queue: LockedQueue = Mutex::new(TaskQueue::with_capacity(self.queue_capacity));
        lock(&queue)?.enqueue(seed)?;

        let detector = TerminationDetector::new();

        let tallies: Vec<WorkerStats> = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            for id in 0..self.workers {
                let worker = SharedWorker {
                    id,
                    f,
                    queue: &queue,
                    detector: &detector,
                };
                let spawned = thread::Builder::new()
                    .name(format!("sq-worker-{id}"))
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

        let queue = queue
            .into_inner()
            .map_err(|e| SchedulerError::LockPoisoned(format!("task queue lock: {}", e)))?;
        let mut stats = RunStats {
            active_at_exit,
            max_queue_depth: queue.high_water(),
            ..Default::default()
        };
        for tally in tallies {
            stats.record_worker(tally);
        }
        let value = stats.combined_partial_sums();

        info!(
            "Shared-queue run done in {:.3}s: value={:e}, evaluations={}",
            start.elapsed().as_secs_f64(),
            value,
            stats.evaluations
        );
        Ok(Outcome { value, stats })
    }
}

struct SharedWorker<'a> {
    id: usize,
    f: &'a dyn Integrand,
    queue: &'a LockedQueue,
    detector: &'a TerminationDetector,
}

impl SharedWorker<'_> {
    fn run(self) -> WorkerStats {
        let mut tally = Tally::new(self.id);
        drive_guarded(self.id, self.detector, &mut tally, |tally| self.drive(tally));
        let stats = tally.into_stats();
        debug!(
            worker = self.id,
            evaluations = stats.evaluations,
            accepted = stats.accepted,
            "shared-queue worker exiting"
        );
        stats
    }

    fn drive(&self, tally: &mut Tally) -> Result<(), SchedulerError> {
        let backoff = Backoff::new();
        loop {
            if self.detector.is_aborted() {
                return Ok(());
            }

            let (task, done) = {
                let mut queue = lock(self.queue)?;
                let task = if queue.is_empty() {
                    None
                } else {
                    let task = queue.dequeue()?;
                    self.detector.begin();
                    Some(task)
                };
                let done = self.detector.is_complete(queue.is_empty());
                (task, done)
            };

            if done {
                return Ok(());
            }

            let Some(task) = task else {
                backoff.snooze();
                continue;
            };
            backoff.reset();

            if let Some((left, right)) = tally.process(self.f, &task) {
                let mut queue = lock(self.queue)?;
                queue.enqueue(left)?;
                queue.enqueue(right)?;
            }
            self.detector.finish();
        }
    }
}
