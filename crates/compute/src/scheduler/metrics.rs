use serde::Serialize;

/// What one queue-based worker did during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerStats {
    pub worker: usize,
    /// Sum of this worker's accepted contributions.
    pub partial_sum: f64,
    /// Kernel invocations.
    pub evaluations: u64,
    pub accepted: u64,
    pub splits: u64,
    /// Tasks taken from a peer's queue.
    pub steals: u64,
}

/// Totals for one scheduler run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Kernel invocations across all workers.
    pub evaluations: u64,
    /// Leaves of the subdivision tree.
    pub accepted: u64,
    /// Internal nodes of the subdivision tree.
    pub splits: u64,
    pub steals: u64,
    /// Peak size reached by any single queue (0 for fork-join).
    pub max_queue_depth: usize,
    /// In-flight counter when the run was declared complete.
    pub active_at_exit: usize,
    /// Per-worker breakdown (empty for fork-join).
    pub workers: Vec<WorkerStats>,
}

impl RunStats {
    /// Fold a worker's tally into the totals.
    pub fn record_worker(&mut self, worker: WorkerStats) {
        self.evaluations += worker.evaluations;
        self.accepted += worker.accepted;
        self.splits += worker.splits;
        self.steals += worker.steals;
        self.workers.push(worker);
    }

    /// Sum of the per-worker partial sums, in worker order.
    pub fn combined_partial_sums(&self) -> f64 {
        self.workers.iter().map(|w| w.partial_sum).sum()
    }

    /// Every created task was processed exactly once: a binary tree grown
    /// from one seed has one more leaf than it has internal nodes.
    pub fn is_consistent(&self) -> bool {
        self.evaluations == self.accepted + self.splits && self.accepted == self.splits + 1
    }
}
