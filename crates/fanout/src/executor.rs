//! Job bodies.
//!
//! A [`JobExecutor`] performs the side effect of one job. Workers await it to
//! completion before taking their next job, so an executor never runs two jobs
//! on the same worker at once. Any error it returns aborts the whole run.

use core::future::Future;

/// Executes one job descriptor.
pub trait JobExecutor<J>: Send + Sync + 'static {
    /// Failure reported for a single job.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Runs the job to completion.
    fn execute(&self, job: J) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A [`JobExecutor`] backed by an async closure.
///
/// Created with [`from_fn`].
#[derive(Clone, Debug)]
pub struct FnExecutor<F>(F);

/// Builds a [`JobExecutor`] from a closure returning a future.
///
/// ```
/// use fanout::executor;
///
/// let exec = executor::from_fn(|n: u32| async move {
///     if n > 10 {
///         return Err(std::io::Error::other("too large"));
///     }
///     Ok(())
/// });
/// # let _ = exec;
/// ```
pub const fn from_fn<F, J, Fut, E>(f: F) -> FnExecutor<F>
where
    F: Fn(J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send,
    E: core::error::Error + Send + Sync + 'static,
{
    FnExecutor(f)
}

impl<F, J, Fut, E> JobExecutor<J> for FnExecutor<F>
where
    F: Fn(J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send,
    E: core::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn execute(&self, job: J) -> impl Future<Output = Result<(), E>> + Send {
        (self.0)(job)
    }
}
