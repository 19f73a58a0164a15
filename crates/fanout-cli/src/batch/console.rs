use super::activity::User;
use super::telemetry;
use fanout::{Completion, Reporter, RunSummary};

/// Prints batch progress to stdout and feeds the metric handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter<User> for ConsoleReporter {
    fn job_enqueued(&self, _seq: u64, user: &User) {
        println!("generated user {}", user.id);
        telemetry::increment_jobs_enqueued();
    }

    fn job_completed(&self, completion: &Completion, done: usize, total: usize) {
        // Users are numbered from 1 in submission order.
        println!(
            "finished uid {} on worker {} ({done}/{total})",
            completion.seq + 1,
            completion.worker_id
        );
        telemetry::increment_jobs_completed();
        telemetry::record_job_duration(completion.elapsed.as_secs_f64() * 1000.0);
    }

    fn finished(&self, summary: &RunSummary) {
        telemetry::record_run_duration(summary.elapsed.as_secs_f64() * 1000.0);
        tracing::info!(
            users = summary.jobs,
            workers = summary.workers,
            "All records written"
        );
    }
}
