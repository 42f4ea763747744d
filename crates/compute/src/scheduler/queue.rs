//! Bounded LIFO task queue.
//!
//! A queue is plain data; callers wrap it in a `Mutex` (one lock per queue)
//! and hold that lock across every read and mutation.

use std::sync::{Mutex, MutexGuard, TryLockError};

use subdivide_core::Interval;

use super::task::SchedulerError;

/// Slots reserved up front; larger queues grow on demand up to `capacity`.
const PREALLOCATE: usize = 1024;

#[derive(Debug)]
pub struct TaskQueue {
    entries: Vec<Interval>,
    capacity: usize,
    high_water: usize,
}

impl TaskQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(PREALLOCATE)),
            capacity,
            high_water: 0,
        }
    }

    /// Push onto the top. Fails, without storing the task, when full.
    pub fn enqueue(&mut self, task: Interval) -> Result<(), SchedulerError> {
        if self.entries.len() == self.capacity {
            return Err(SchedulerError::QueueOverflow {
                capacity: self.capacity,
            });
        }
        self.entries.push(task);
        self.high_water = self.high_water.max(self.entries.len());
        Ok(())
    }

    /// Pop the most recently enqueued task.
    ///
    /// Callers check `is_empty` under the same lock first; reaching the
    /// error means that check was skipped.
    pub fn dequeue(&mut self) -> Result<Interval, SchedulerError> {
        self.entries.pop().ok_or(SchedulerError::EmptyQueue)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest size this queue has reached.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

/// A queue behind its lock.
pub type LockedQueue = Mutex<TaskQueue>;

pub(crate) fn lock(queue: &LockedQueue) -> Result<MutexGuard<'_, TaskQueue>, SchedulerError> {
    queue
        .lock()
        .map_err(|e| SchedulerError::LockPoisoned(format!("task queue lock: {}", e)))
}

/// Non-blocking lock; `Ok(None)` when another worker holds it.
pub(crate) fn try_lock(
    queue: &LockedQueue,
) -> Result<Option<MutexGuard<'_, TaskQueue>>, SchedulerError> {
    match queue.try_lock() {
        Ok(guard) => Ok(Some(guard)),
        Err(TryLockError::WouldBlock) => Ok(None),
        Err(TryLockError::Poisoned(e)) => Err(SchedulerError::LockPoisoned(format!(
            "task queue lock: {}",
            e
        ))),
    }
}
