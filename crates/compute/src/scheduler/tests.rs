use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use subdivide_core::{Integrand, Interval, SchedulerConfig, Strategy};

use super::*;

fn queue_schedulers(workers: usize, capacity: usize) -> Vec<Box<dyn Scheduler>> {
    vec![
        Box::new(WorkStealingScheduler::new(workers, capacity)),
        Box::new(SharedQueueScheduler::new(workers, capacity)),
    ]
}

fn all_schedulers(workers: usize, capacity: usize) -> Vec<Box<dyn Scheduler>> {
    let mut schedulers = queue_schedulers(workers, capacity);
    schedulers.push(Box::new(ForkJoinScheduler::new(workers)));
    schedulers
}

/// A task that splits on width alone: `tol = 0` can never be met.
fn width_only(f: &dyn Integrand, left: f64, right: f64) -> Interval {
    let mut task = Interval::seed(f, left, right, 1.0).unwrap();
    task.tol = 0.0;
    task
}

#[test]
fn build_selects_configured_strategy() {
    for strategy in Strategy::ALL {
        let config = SchedulerConfig {
            strategy,
            worker_threads: 3,
            queue_capacity: 100,
        };
        let scheduler = build(&config);
        assert_eq!(scheduler.strategy(), strategy);
        assert_eq!(scheduler.workers(), 3);
    }
}

#[test]
fn zero_workers_still_runs_one() {
    let f = |x: f64| x * x;
    let seed = Interval::seed(&f, 0.0, 1.0, 1e-8).unwrap();
    for scheduler in all_schedulers(0, 16) {
        assert_eq!(scheduler.workers(), 1);
        let outcome = scheduler.run(&f, seed).unwrap();
        assert!((outcome.value - 1.0 / 3.0).abs() < 1e-15);
    }
}

#[test]
fn queue_schedulers_finish_with_nothing_in_flight() {
    let f = |x: f64| x.sin();
    let seed = Interval::seed(&f, 0.0, 10.0, 1e-8).unwrap();
    for workers in [1, 2, 4] {
        for scheduler in queue_schedulers(workers, 10_000) {
            let outcome = scheduler.run(&f, seed).unwrap();
            let stats = &outcome.stats;
            assert_eq!(stats.active_at_exit, 0, "{} x{workers}", scheduler.strategy());
            assert!(stats.is_consistent(), "{} x{workers}: {stats:?}", scheduler.strategy());
            assert_eq!(stats.workers.len(), workers);
            assert!(stats.max_queue_depth >= 1);
            assert!(stats.max_queue_depth <= 10_000);
            assert_eq!(outcome.value, stats.combined_partial_sums());
        }
    }
}

#[test]
fn every_task_is_processed_exactly_once() {
    // Three samples for the seed, then exactly two per kernel call. A task
    // processed twice or dropped would break the equality.
    for workers in [1, 4] {
        for scheduler in all_schedulers(workers, 10_000) {
            let calls = AtomicUsize::new(0);
            let f = |x: f64| {
                calls.fetch_add(1, Ordering::Relaxed);
                (3.0 * x).cos() * x.exp()
            };
            let seed = Interval::seed(&f, -1.0, 2.0, 1e-9).unwrap();
            let outcome = scheduler.run(&f, seed).unwrap();

            let stats = &outcome.stats;
            assert!(stats.is_consistent(), "{}: {stats:?}", scheduler.strategy());
            assert!(stats.splits > 0);
            assert_eq!(
                calls.load(Ordering::Relaxed) as u64,
                3 + 2 * stats.evaluations,
                "{} x{workers}",
                scheduler.strategy()
            );
        }
    }
}

#[test]
fn width_floor_bounds_the_tree() {
    // 1e-11 halves four times before dropping under 1e-12: a full tree of
    // depth 4 with 16 leaves.
    let f = |x: f64| (1.0 / (x + 1e-13)).sin();
    let seed = width_only(&f, 0.0, 1e-11);
    for workers in [1, 3] {
        for scheduler in all_schedulers(workers, 64) {
            let outcome = scheduler.run(&f, seed).unwrap();
            assert_eq!(outcome.stats.accepted, 16, "{}", scheduler.strategy());
            assert_eq!(outcome.stats.splits, 15, "{}", scheduler.strategy());
        }
    }
}

#[test]
fn overflow_aborts_the_run() {
    // Depth-first descent on [0, 1] down to 1e-12 needs ~40 pending tasks.
    let f = |x: f64| x.sin();
    let seed = width_only(&f, 0.0, 1.0);
    for workers in [1, 4] {
        for scheduler in queue_schedulers(workers, 8) {
            let result = scheduler.run(&f, seed);
            assert!(
                matches!(result, Err(SchedulerError::QueueOverflow { capacity: 8 })),
                "{} x{workers}: {:?}",
                scheduler.strategy(),
                result.map(|o| o.value)
            );
        }
    }
}

#[test]
fn seed_larger_than_capacity_fails_before_spawning() {
    let f = |x: f64| x;
    let seed = Interval::seed(&f, 0.0, 1.0, 1e-6).unwrap();
    for scheduler in queue_schedulers(2, 0) {
        assert!(matches!(
            scheduler.run(&f, seed),
            Err(SchedulerError::QueueOverflow { capacity: 0 })
        ));
    }
}

#[test]
fn concurrent_runs_do_not_interfere() {
    let sin = |x: f64| x.sin();
    let square = |x: f64| x * x;
    let sin_seed = Interval::seed(&sin, 0.0, 10.0, 1e-8).unwrap();
    let square_seed = Interval::seed(&square, 0.0, 3.0, 1e-8).unwrap();

    let (a, b) = thread::scope(|s| {
        let a = s.spawn(|| WorkStealingScheduler::new(3, 1000).run(&sin, sin_seed));
        let b = s.spawn(|| SharedQueueScheduler::new(3, 1000).run(&square, square_seed));
        (a.join().unwrap().unwrap(), b.join().unwrap().unwrap())
    });

    assert!((a.value - (1.0 - 10f64.cos())).abs() < 1e-6);
    assert!((b.value - 9.0).abs() < 1e-12);
    assert_eq!(a.stats.active_at_exit, 0);
    assert_eq!(b.stats.active_at_exit, 0);
}

#[test]
fn panicking_integrand_aborts_instead_of_hanging() {
    let f = |x: f64| {
        if x > 9.0 && x < 9.5 {
            panic!("integrand undefined at {x}");
        }
        x.sin()
    };
    let seed = Interval::seed(&f, 0.0, 10.0, 1e-10).unwrap();
    for workers in [1, 2, 4] {
        for scheduler in queue_schedulers(workers, 10_000) {
            let result = scheduler.run(&f, seed);
            assert!(
                matches!(result, Err(SchedulerError::WorkerPanicked(_))),
                "{} x{workers}: {:?}",
                scheduler.strategy(),
                result.map(|o| o.value)
            );
        }
    }
}

#[test]
fn idle_workers_steal_from_busy_peers() {
    // Slow enough that worker 0 cannot drain the whole tree before its
    // peers come up; the seed lands in worker 0's queue only.
    let f = |x: f64| {
        thread::sleep(Duration::from_micros(50));
        x.sin()
    };
    let seed = Interval::seed(&f, 0.0, 10.0, 1e-10).unwrap();
    let outcome = WorkStealingScheduler::new(4, 10_000).run(&f, seed).unwrap();

    let stats = &outcome.stats;
    assert!(stats.steals > 0, "no steals: {stats:?}");
    let busy = stats.workers.iter().filter(|w| w.evaluations > 0).count();
    assert!(busy >= 2, "only {busy} worker(s) did any work: {stats:?}");
    assert!(stats.is_consistent());
    assert_eq!(stats.active_at_exit, 0);
}
