//! Fixed-size pool of async workers.
//!
//! ## Structure
//!
//! - [`worker`] - the per-task loop: dequeue, execute, signal completion.
//! - [`manager`] - spawns the workers and joins them at the end of a run.
//! - [`failure`] - the first fatal job error, shared by every worker.

pub(crate) mod failure;
pub(crate) mod manager;
pub(crate) mod worker;

#[cfg(test)]
mod tests;
