//! Synthetic user activity: the job descriptors of the batch.
//!
//! [`ActivitySource`] turns an [`ActivityContext`] (random source plus action
//! vocabulary) into a stream of [`User`]s. All randomness flows through the
//! context that the source owns; there is no process-wide seed.

use chrono::{DateTime, SecondsFormat, Utc};
use core::fmt::{self, Write as _};
use fanout::JobSource;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;

/// Actions drawn for generated activity entries.
pub const DEFAULT_ACTIONS: [&str; 5] = [
    "logged in",
    "logged out",
    "created record",
    "deleted record",
    "updated account",
];

/// One entry of a user's activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogEntry {
    pub action: Arc<str>,
    pub timestamp: DateTime<Utc>,
}

/// A generated user and its activity log, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub logs: Vec<ActivityLogEntry>,
}

impl User {
    /// Renders the record written to the user's file.
    ///
    /// ```text
    /// UID: 1; Email: user1@company.com;
    /// Activity Log:
    /// 0. [logged in] at 2024-01-01T00:00:00Z
    /// ```
    pub fn activity_info(&self) -> String {
        let mut out = String::with_capacity(48 + self.logs.len() * 48);
        // Writing into a String cannot fail.
        let _ = self.write_activity_info(&mut out);
        out
    }

    fn write_activity_info(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "UID: {}; Email: {};", self.id, self.email)?;
        writeln!(out, "Activity Log:")?;
        for (index, entry) in self.logs.iter().enumerate() {
            writeln!(
                out,
                "{index}. [{}] at {}",
                entry.action,
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
        }
        Ok(())
    }
}

/// Random source and vocabulary used to generate activity.
#[derive(Debug, Clone)]
pub struct ActivityContext {
    rng: StdRng,
    actions: Vec<Arc<str>>,
    max_log_entries: usize,
}

impl ActivityContext {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            actions: DEFAULT_ACTIONS.iter().map(|a| Arc::from(*a)).collect(),
            max_log_entries: 1000,
        }
    }

    /// Reproducible generation from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Each user gets between `0` and `max - 1` entries.
    #[must_use]
    pub const fn with_max_log_entries(mut self, max: usize) -> Self {
        self.max_log_entries = max;
        self
    }

    /// Picks an action uniformly over the whole vocabulary.
    fn action(&mut self) -> Arc<str> {
        let index = self.rng.random_range(0..self.actions.len());
        Arc::clone(&self.actions[index])
    }

    fn logs(&mut self) -> Vec<ActivityLogEntry> {
        let count = if self.max_log_entries == 0 {
            0
        } else {
            self.rng.random_range(0..self.max_log_entries)
        };

        (0..count)
            .map(|_| ActivityLogEntry {
                action: self.action(),
                timestamp: Utc::now(),
            })
            .collect()
    }

    /// Generates the user with the given 1-based id.
    pub fn user(&mut self, id: u64) -> User {
        User {
            id,
            email: format!("user{id}@company.com"),
            logs: self.logs(),
        }
    }
}

/// Yields users `1..=count` generated from an owned [`ActivityContext`].
#[derive(Debug, Clone)]
pub struct ActivitySource {
    ctx: ActivityContext,
}

impl ActivitySource {
    pub const fn new(ctx: ActivityContext) -> Self {
        Self { ctx }
    }
}

impl JobSource for ActivitySource {
    type Job = User;

    fn produce(&mut self, count: usize) -> impl Iterator<Item = User> {
        (1..=count as u64).map(|id| self.ctx.user(id))
    }
}
