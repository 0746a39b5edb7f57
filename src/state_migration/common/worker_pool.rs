// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{num::NonZeroUsize, time::Duration};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::MigrationError;

/// How often a blocked acquirer re-checks its cancellation token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Counting semaphore bounding the number of actors migrated at once. One
/// pool is created per migration run.
pub(super) struct WorkerPool {
    capacity: usize,
    available: Mutex<usize>,
    released: Condvar,
}

/// A unit of [`WorkerPool`] capacity, returned to the pool on drop.
pub(super) struct WorkerPermit<'a> {
    pool: &'a WorkerPool,
}

impl Drop for WorkerPermit<'_> {
    fn drop(&mut self) {
        self.pool.release(1);
    }
}

impl WorkerPool {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: capacity.get(),
            available: Mutex::new(capacity.get()),
            released: Condvar::new(),
        }
    }

    /// Blocks until one unit of capacity is free.
    pub fn acquire(&self, cancel: &CancellationToken) -> Result<WorkerPermit<'_>, MigrationError> {
        self.acquire_many(1, cancel, || {})?;
        Ok(WorkerPermit { pool: self })
    }

    /// Blocks until every permit has been returned, i.e. no task is running.
    /// `on_wait` runs outside the pool lock each time the wait wakes up, at
    /// least once per poll interval.
    pub fn wait_idle(
        &self,
        cancel: &CancellationToken,
        on_wait: impl FnMut(),
    ) -> Result<(), MigrationError> {
        self.acquire_many(self.capacity, cancel, on_wait)?;
        self.release(self.capacity);
        Ok(())
    }

    fn acquire_many(
        &self,
        n: usize,
        cancel: &CancellationToken,
        mut on_wait: impl FnMut(),
    ) -> Result<(), MigrationError> {
        let mut available = self.available.lock();
        loop {
            if cancel.is_cancelled() {
                return Err(MigrationError::Cancelled);
            }
            if *available >= n {
                *available -= n;
                return Ok(());
            }
            self.released.wait_for(&mut available, CANCEL_POLL_INTERVAL);
            MutexGuard::unlocked(&mut available, &mut on_wait);
        }
    }

    fn release(&self, n: usize) {
        *self.available.lock() += n;
        self.released.notify_all();
    }
}
