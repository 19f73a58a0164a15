use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A countdown shared between the workers and the orchestrator.
///
/// Pre-set to the number of jobs in the batch. Each finished job calls
/// [`done`](Self::done); [`wait`](Self::wait) resolves once the count reaches
/// zero. Clones share the same counter.
#[derive(Clone, Debug)]
pub struct CompletionBarrier {
    inner: Arc<BarrierState>,
}

#[derive(Debug)]
struct BarrierState {
    remaining: AtomicUsize,
    zero: Notify,
}

impl CompletionBarrier {
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(BarrierState {
                remaining: AtomicUsize::new(count),
                zero: Notify::new(),
            }),
        }
    }

    /// Marks one job as finished.
    ///
    /// # Panics
    ///
    /// Panics if called more times than the barrier was created for.
    pub fn done(&self) {
        match self
            .inner
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.inner.zero.notify_waiters(),
            Ok(_) => {}
            Err(_) => panic!("completion barrier decremented below zero"),
        }
    }

    /// Drops `count` jobs that will never run from the countdown, so that
    /// [`wait`](Self::wait) resolves once the jobs that did run are done.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` jobs are outstanding.
    pub fn release(&self, count: usize) {
        match self
            .inner
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(count))
        {
            Ok(n) if n == count && count > 0 => self.inner.zero.notify_waiters(),
            Ok(_) => {}
            Err(_) => panic!("completion barrier decremented below zero"),
        }
    }

    /// Jobs still outstanding.
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    /// Waits until every job has called [`done`](Self::done).
    pub async fn wait(&self) {
        loop {
            // Register before checking so a concurrent `notify_waiters`
            // between the load and the await is not missed.
            let zero = self.inner.zero.notified();
            if self.remaining() == 0 {
                return;
            }
            zero.await;
        }
    }
}
