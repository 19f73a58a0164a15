#![doc = include_str!("../README.md")]

mod completion;
mod config;
mod error;
pub mod executor;
mod orchestrator;
pub(crate) mod pool;
pub mod queue;
mod report;
pub mod source;

pub use crate::completion::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::executor::{FnExecutor, JobExecutor};
pub use crate::orchestrator::*;
pub use crate::queue::{Envelope, JobConsumer, JobProducer};
pub use crate::report::*;
pub use crate::source::{FromFn, JobSource};
