//! Job producers.
//!
//! A [`JobSource`] yields the finite batch of job descriptors for one run. The
//! orchestrator asks for exactly `count` jobs and closes the queue after the
//! last one, so a source only has to describe the jobs, not manage the queue.

/// Produces job descriptors for a run.
pub trait JobSource {
    /// The job descriptor handed to workers.
    type Job: Send + 'static;

    /// Returns the sequence of `count` jobs, in submission order.
    ///
    /// Sources should yield exactly `count` items; the orchestrator stops
    /// after `count` regardless. A shorter sequence ends the batch early: the
    /// jobs it did yield still run, then the run fails with
    /// [`Error::Incomplete`](crate::Error::Incomplete).
    fn produce(&mut self, count: usize) -> impl Iterator<Item = Self::Job>;
}

/// A [`JobSource`] backed by a closure receiving the job's index.
///
/// Created with [`from_fn`].
#[derive(Clone, Debug)]
pub struct FromFn<F>(F);

/// Builds a [`JobSource`] that calls `f(index)` for each of the `count` jobs.
///
/// ```
/// use fanout::{JobSource, source};
///
/// let mut squares = source::from_fn(|i| i * i);
/// assert_eq!(squares.produce(4).collect::<Vec<_>>(), vec![0, 1, 4, 9]);
/// ```
pub const fn from_fn<F, J>(f: F) -> FromFn<F>
where
    F: FnMut(usize) -> J,
{
    FromFn(f)
}

impl<F, J> JobSource for FromFn<F>
where
    F: FnMut(usize) -> J,
    J: Send + 'static,
{
    type Job = J;

    fn produce(&mut self, count: usize) -> impl Iterator<Item = J> {
        (0..count).map(&mut self.0)
    }
}
