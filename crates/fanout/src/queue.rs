//! Bounded FIFO job queue shared between one producer and many workers.
//!
//! [`bounded`] returns the two halves of the queue. The [`JobProducer`] is
//! owned by the orchestrator and tags each job with its submission sequence
//! number. The [`JobConsumer`] is cloned into every worker; each call to
//! [`JobConsumer::dequeue`] hands a job to exactly one caller.
//!
//! Closing is explicit: [`JobProducer::close`] marks the end of the batch and
//! workers observe `None` once the remaining jobs are drained. Enqueueing after
//! close and closing twice are programming errors and panic.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// A job tagged with its zero-based submission index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<J> {
    pub seq: u64,
    pub job: J,
}

/// Creates a bounded job queue holding at most `capacity` pending jobs.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn bounded<J>(capacity: usize) -> (JobProducer<J>, JobConsumer<J>) {
    assert!(capacity > 0, "job queue capacity must be greater than 0");
    let (tx, rx) = mpsc::channel(capacity);
    (
        JobProducer {
            tx: Some(tx),
            next_seq: 0,
            capacity,
        },
        JobConsumer {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Sending half of the job queue.
#[derive(Debug)]
pub struct JobProducer<J> {
    tx: Option<mpsc::Sender<Envelope<J>>>,
    next_seq: u64,
    capacity: usize,
}

impl<J> JobProducer<J> {
    /// Enqueues a job, waiting while the queue is full.
    ///
    /// Returns the job's sequence number, or gives the job back if every
    /// consumer has already been dropped.
    ///
    /// # Panics
    ///
    /// Panics if the queue was closed.
    pub async fn enqueue(&mut self, job: J) -> Result<u64, J> {
        self.enqueue_with(job, |_, _| {}).await
    }

    /// Like [`enqueue`](Self::enqueue), but calls `on_accept` with the job's
    /// sequence number once a slot is secured and just before the job is
    /// handed over. `on_accept` is not called if the job is given back, or if
    /// the returned future is dropped while waiting for room.
    ///
    /// # Panics
    ///
    /// Panics if the queue was closed.
    pub async fn enqueue_with<F>(&mut self, job: J, on_accept: F) -> Result<u64, J>
    where
        F: FnOnce(u64, &J),
    {
        let Some(tx) = self.tx.as_ref() else {
            panic!("enqueue on a closed job queue");
        };

        let Ok(permit) = tx.reserve().await else {
            return Err(job);
        };

        let seq = self.next_seq;
        on_accept(seq, &job);
        permit.send(Envelope { seq, job });
        self.next_seq += 1;
        Ok(seq)
    }

    /// Closes the queue. Jobs already enqueued remain available to workers.
    ///
    /// # Panics
    ///
    /// Panics if the queue was already closed.
    pub fn close(&mut self) {
        if self.tx.take().is_none() {
            panic!("job queue closed twice");
        }
    }

    pub const fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    /// Number of jobs enqueued so far.
    pub const fn enqueued(&self) -> u64 {
        self.next_seq
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Receiving half of the job queue. Cheap to clone; all clones share one
/// underlying channel.
#[derive(Debug)]
pub struct JobConsumer<J> {
    // Held across `recv().await`, so this must be the async mutex.
    rx: Arc<Mutex<mpsc::Receiver<Envelope<J>>>>,
}

impl<J> Clone for JobConsumer<J> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<J> JobConsumer<J> {
    /// Takes the next job, waiting while the queue is empty and open.
    ///
    /// Returns `None` once the queue is closed and drained. Cancel safe: a
    /// dropped call never loses a job.
    pub async fn dequeue(&self) -> Option<Envelope<J>> {
        self.rx.lock().await.recv().await
    }

    /// Number of jobs currently waiting in the queue.
    pub async fn len(&self) -> usize {
        self.rx.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
