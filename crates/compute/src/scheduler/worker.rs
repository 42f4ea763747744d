//! Pieces shared by the queue-based worker loops.

use std::panic::{self, AssertUnwindSafe};

use subdivide_core::{Integrand, Interval};

use super::metrics::WorkerStats;
use super::task::SchedulerError;
use super::termination::TerminationDetector;
use crate::kernel::{self, Evaluation};

/// Worker-local accumulator. Never shared, so accepting a contribution
/// costs no synchronization.
#[derive(Debug)]
pub(crate) struct Tally {
    stats: WorkerStats,
}

impl Tally {
    pub(crate) fn new(worker: usize) -> Self {
        Self {
            stats: WorkerStats {
                worker,
                ..Default::default()
            },
        }
    }

    /// Run the kernel on `task`. Accepted values go into the partial sum;
    /// a split hands the children back for the caller to enqueue.
    pub(crate) fn process(&mut self, f: &dyn Integrand, task: &Interval) -> Option<(Interval, Interval)> {
        self.stats.evaluations += 1;
        match kernel::evaluate(f, task) {
            Evaluation::Accept(value) => {
                self.stats.partial_sum += value;
                self.stats.accepted += 1;
                None
            }
            Evaluation::Split(left, right) => {
                self.stats.splits += 1;
                Some((left, right))
            }
        }
    }

    pub(crate) fn record_steal(&mut self) {
        self.stats.steals += 1;
    }

    pub(crate) fn into_stats(self) -> WorkerStats {
        self.stats
    }
}

/// Run a worker loop. Errors and panics both abort the run, so peers stop
/// waiting on an in-flight task that will never be resolved.
pub(crate) fn drive_guarded<F>(id: usize, detector: &TerminationDetector, tally: &mut Tally, drive: F)
where
    F: FnOnce(&mut Tally) -> Result<(), SchedulerError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| drive(tally))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => detector.abort(err),
        Err(_) => detector.abort(SchedulerError::WorkerPanicked(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_accepts_and_splits() {
        let f = |x: f64| x.sin();
        let mut tally = Tally::new(3);

        let wide = Interval::seed(&f, 0.0, 10.0, 1e-9).unwrap();
        let children = tally.process(&f, &wide);
        assert!(children.is_some());

        let flat = Interval::seed(&|x: f64| 2.0 * x, 0.0, 1.0, 1e-9).unwrap();
        assert!(tally.process(&|x: f64| 2.0 * x, &flat).is_none());

        let stats = tally.into_stats();
        assert_eq!(stats.worker, 3);
        assert_eq!(stats.evaluations, 2);
        assert_eq!(stats.splits, 1);
        assert_eq!(stats.accepted, 1);
        assert!((stats.partial_sum - 1.0).abs() < 1e-15);
    }

    #[test]
    fn guarded_drive_turns_panic_into_abort() {
        let detector = TerminationDetector::new();
        let mut tally = Tally::new(2);
        drive_guarded(2, &detector, &mut tally, |_| panic!("integrand blew up"));

        assert!(detector.is_aborted());
        assert!(matches!(detector.into_failure(), Some(SchedulerError::WorkerPanicked(2))));
    }

    #[test]
    fn guarded_drive_records_errors() {
        let detector = TerminationDetector::new();
        let mut tally = Tally::new(0);
        drive_guarded(0, &detector, &mut tally, |_| Err(SchedulerError::EmptyQueue));
        assert!(matches!(detector.into_failure(), Some(SchedulerError::EmptyQueue)));

        let detector = TerminationDetector::new();
        drive_guarded(0, &detector, &mut tally, |_| Ok(()));
        assert!(detector.into_failure().is_none());
    }
}
