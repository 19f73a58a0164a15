use crate::{
    Completion, CompletionOrder, Error, JobExecutor, JobSource, Orchestrator, PoolConfig,
    Reporter, RunSummary, SinkKind, executor, source,
};
use core::time::Duration;
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, timeout};

const SINKS: [SinkKind; 2] = [SinkKind::Barrier, SinkKind::Channel];

/// Records the jobs an executor was handed, in the order workers took them.
#[derive(Clone, Default)]
struct Started(Arc<Mutex<Vec<usize>>>);

impl Started {
    fn jobs(&self) -> Vec<usize> {
        self.0.lock().unwrap().clone()
    }
}

/// Executor that records each job, optionally sleeps, and fails on `fail_on`.
fn recording_executor(
    started: Started,
    work: impl Fn(usize) -> Duration + Send + Sync + 'static,
    fail_on: Option<usize>,
) -> impl JobExecutor<usize> {
    executor::from_fn(move |job: usize| {
        let started = started.clone();
        let work = work(job);
        async move {
            started.0.lock().unwrap().push(job);
            if fail_on == Some(job) {
                return Err(io::Error::other(format!("job {job} failed")));
            }
            if !work.is_zero() {
                sleep(work).await;
            }
            Ok(())
        }
    })
}

fn instant(_: usize) -> Duration {
    Duration::ZERO
}

fn one_second(_: usize) -> Duration {
    Duration::from_secs(1)
}

#[derive(Clone, Default)]
struct Events {
    enqueued: Arc<AtomicUsize>,
    completed: Arc<Mutex<Vec<(u64, usize)>>>,
    finished: Arc<AtomicUsize>,
}

impl Reporter<usize> for Events {
    fn job_enqueued(&self, _seq: u64, _job: &usize) {
        self.enqueued.fetch_add(1, Ordering::SeqCst);
    }

    fn job_completed(&self, completion: &Completion, done: usize, _total: usize) {
        self.completed.lock().unwrap().push((completion.seq, done));
    }

    fn finished(&self, _summary: &RunSummary) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

impl Events {
    fn completed_seqs(&self) -> Vec<u64> {
        self.completed.lock().unwrap().iter().map(|(seq, _)| *seq).collect()
    }
}

fn config(jobs: usize, workers: usize, sink: SinkKind) -> PoolConfig {
    PoolConfig::new(jobs, workers)
        .expect("valid config")
        .with_sink(sink)
}

async fn run_every_job_completes_exactly_once(jobs: usize, workers: usize, sink: SinkKind) {
    let started = Started::default();
    let events = Events::default();
    let orchestrator = Orchestrator::new(config(jobs, workers, sink));

    let summary = orchestrator
        .run(
            &mut source::from_fn(|i| i),
            recording_executor(started.clone(), instant, None),
            events.clone(),
        )
        .await
        .expect("run failed");

    assert_eq!(summary.jobs, jobs);
    assert_eq!(summary.workers, workers);
    assert_eq!(summary.completed, jobs);

    let mut seen = started.jobs();
    seen.sort_unstable();
    assert_eq!(seen, (0..jobs).collect::<Vec<_>>(), "{sink:?} {jobs}/{workers}");

    let unique: HashSet<_> = events.completed_seqs().into_iter().collect();
    assert_eq!(unique.len(), jobs, "duplicate or missing completion");
    assert_eq!(events.enqueued.load(Ordering::SeqCst), jobs);
    assert_eq!(events.finished.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_job_completes_exactly_once() {
    for sink in SINKS {
        for jobs in [0, 1, 7, 100, 1000] {
            for workers in [1, 3, 12] {
                run_every_job_completes_exactly_once(jobs, workers, sink).await;
            }
        }
    }
}

#[tokio::test]
async fn zero_jobs_returns_immediately() {
    for sink in SINKS {
        let started = Started::default();
        let summary = timeout(
            Duration::from_secs(1),
            Orchestrator::new(config(0, 4, sink)).run(
                &mut source::from_fn(|i| i),
                recording_executor(started.clone(), one_second, None),
                (),
            ),
        )
        .await
        .expect("run with no jobs hung")
        .expect("run failed");

        assert_eq!(summary.completed, 0);
        assert!(started.jobs().is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn single_worker_runs_jobs_serially() {
    for sink in SINKS {
        let started = Started::default();
        let summary = Orchestrator::new(config(5, 1, sink))
            .run(
                &mut source::from_fn(|i| i),
                recording_executor(started.clone(), one_second, None),
                (),
            )
            .await
            .expect("run failed");

        assert!(summary.elapsed >= Duration::from_secs(5));
        // One worker takes jobs strictly in submission order.
        assert_eq!(started.jobs(), vec![0, 1, 2, 3, 4]);
    }
}

#[tokio::test(start_paused = true)]
async fn workers_run_jobs_in_parallel() {
    for sink in SINKS {
        let summary = Orchestrator::new(config(100, 12, sink))
            .run(
                &mut source::from_fn(|i| i),
                recording_executor(Started::default(), one_second, None),
                (),
            )
            .await
            .expect("run failed");

        // ceil(100 / 12) rounds of one second each, not 100 seconds.
        assert!(summary.elapsed >= Duration::from_secs(9), "{summary:?}");
        assert!(summary.elapsed < Duration::from_secs(10), "{summary:?}");
    }
}

#[tokio::test]
async fn consecutive_runs_do_not_interfere() {
    for sink in SINKS {
        let started = Started::default();
        let orchestrator = Orchestrator::new(config(50, 4, sink));
        let mut jobs = source::from_fn(|i| i);

        for _ in 0..2 {
            let summary = orchestrator
                .run(
                    &mut jobs,
                    recording_executor(started.clone(), instant, None),
                    (),
                )
                .await
                .expect("run failed");
            assert_eq!(summary.completed, 50);
        }

        let mut seen = started.jobs();
        seen.sort_unstable();
        let expected: Vec<_> = (0..50).flat_map(|i| [i, i]).collect();
        assert_eq!(seen, expected);
    }
}

#[tokio::test]
async fn failure_stops_dispatch_with_one_worker() {
    for sink in SINKS {
        let started = Started::default();
        let events = Events::default();
        let err = Orchestrator::new(config(10, 1, sink))
            .run(
                &mut source::from_fn(|i| i),
                recording_executor(started.clone(), instant, Some(3)),
                events.clone(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::JobFailed { seq: 3, .. }), "{err:?}");
        assert_eq!(started.jobs(), vec![0, 1, 2, 3]);
        assert_eq!(events.finished.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn failure_stops_dispatch_across_workers() {
    for sink in SINKS {
        let started = Started::default();
        // Job 10 is taken in the third round (t = 2s) and fails at once. Job
        // 11 is only started if its worker got to the queue before the abort;
        // nothing past the third round ever starts.
        let err = Orchestrator::new(config(100, 4, sink))
            .run(
                &mut source::from_fn(|i| i),
                recording_executor(started.clone(), one_second, Some(10)),
                (),
            )
            .await
            .unwrap_err();

        assert_eq!(err.failed_seq(), Some(10));
        let mut seen = started.jobs();
        seen.sort_unstable();
        assert!(matches!(seen.len(), 11 | 12), "{seen:?}");
        assert_eq!(seen, (0..seen.len()).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn failure_is_surfaced_with_its_source() {
    let err = Orchestrator::new(config(3, 2, SinkKind::Barrier))
        .run(
            &mut source::from_fn(|i| i),
            recording_executor(Started::default(), instant, Some(0)),
            (),
        )
        .await
        .unwrap_err();

    let source = core::error::Error::source(&err).expect("missing source");
    assert_eq!(source.to_string(), "job 0 failed");
}

#[tokio::test]
async fn panicking_worker_aborts_the_run() {
    for sink in SINKS {
        let exec = executor::from_fn(|job: usize| async move {
            if job == 2 {
                panic!("executor blew up on job {job}");
            }
            Ok::<(), io::Error>(())
        });

        let err = timeout(
            Duration::from_secs(5),
            Orchestrator::new(config(10, 1, sink)).run(&mut source::from_fn(|i| i), exec, ()),
        )
        .await
        .expect("run hung after a worker panic")
        .unwrap_err();

        assert!(matches!(err, Error::WorkerPanicked { worker_id: 0 }), "{err:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn submission_order_reports_completions_in_seq_order() {
    let jobs = 8;
    // Later jobs finish first.
    let work = move |job: usize| Duration::from_millis(((jobs - job) * 10) as u64);

    let events = Events::default();
    let config = config(jobs, jobs, SinkKind::Channel).with_order(CompletionOrder::Submission);
    Orchestrator::new(config)
        .run(
            &mut source::from_fn(|i| i),
            recording_executor(Started::default(), work, None),
            events.clone(),
        )
        .await
        .expect("run failed");

    assert_eq!(events.completed_seqs(), (0..jobs as u64).collect::<Vec<_>>());
    let done: Vec<_> = events.completed.lock().unwrap().iter().map(|(_, d)| *d).collect();
    assert_eq!(done, (1..=jobs).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn arrival_order_reports_completions_as_they_finish() {
    let jobs = 8;
    let work = move |job: usize| Duration::from_millis(((jobs - job) * 10) as u64);

    let events = Events::default();
    Orchestrator::new(config(jobs, jobs, SinkKind::Channel))
        .run(
            &mut source::from_fn(|i| i),
            recording_executor(Started::default(), work, None),
            events.clone(),
        )
        .await
        .expect("run failed");

    assert_eq!(
        events.completed_seqs(),
        (0..jobs as u64).rev().collect::<Vec<_>>()
    );
}

#[tokio::test(start_paused = true)]
async fn small_queue_capacity_does_not_deadlock() {
    for sink in SINKS {
        let config = config(50, 3, sink)
            .with_queue_capacity(1)
            .expect("valid capacity");
        let summary = timeout(
            Duration::from_secs(600),
            Orchestrator::new(config).run(
                &mut source::from_fn(|i| i),
                recording_executor(Started::default(), one_second, None),
                (),
            ),
        )
        .await
        .expect("pool deadlocked with a small queue")
        .expect("run failed");

        assert_eq!(summary.completed, 50);
        assert!(summary.elapsed >= Duration::from_secs(17));
    }
}

#[tokio::test(start_paused = true)]
async fn produce_interval_paces_the_producer() {
    let summary = Orchestrator::new(config(5, 5, SinkKind::Barrier))
        .with_produce_interval(Duration::from_millis(100))
        .run(
            &mut source::from_fn(|i| i),
            recording_executor(Started::default(), one_second, None),
            (),
        )
        .await
        .expect("run failed");

    // The last job is enqueued at 400ms and takes a second.
    assert!(summary.elapsed >= Duration::from_millis(1400), "{summary:?}");
    assert!(summary.elapsed < Duration::from_millis(1500), "{summary:?}");
}

/// Yields at most `self.0` jobs, whatever count is asked for.
struct RunsDry(usize);

impl JobSource for RunsDry {
    type Job = usize;

    fn produce(&mut self, count: usize) -> impl Iterator<Item = usize> {
        0..count.min(self.0)
    }
}

#[tokio::test]
async fn source_running_dry_ends_the_batch() {
    for sink in SINKS {
        let started = Started::default();
        let events = Events::default();
        let result = timeout(
            Duration::from_secs(5),
            Orchestrator::new(config(5, 2, sink)).run(
                &mut RunsDry(3),
                recording_executor(started.clone(), instant, None),
                events.clone(),
            ),
        )
        .await
        .unwrap_or_else(|_| panic!("{sink:?} run hung on a short source"));

        let err = result.unwrap_err();
        assert!(
            matches!(
                err,
                Error::Incomplete {
                    expected: 5,
                    observed: 3
                }
            ),
            "{sink:?}: {err:?}"
        );

        let mut seen = started.jobs();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2], "{sink:?}");
        assert_eq!(events.enqueued.load(Ordering::SeqCst), 3);
        assert_eq!(events.finished.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn jobs_refused_after_abort_are_not_reported_as_enqueued() {
    for sink in SINKS {
        let started = Started::default();
        let events = Events::default();
        let config = config(10, 1, sink)
            .with_queue_capacity(1)
            .expect("valid capacity");

        // Job 1 waits for room while job 0 fails; the abort wins the race
        // for the freed slot.
        let err = Orchestrator::new(config)
            .run(
                &mut source::from_fn(|i| i),
                recording_executor(started.clone(), instant, Some(0)),
                events.clone(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.failed_seq(), Some(0));
        assert_eq!(started.jobs(), vec![0]);
        assert_eq!(events.enqueued.load(Ordering::SeqCst), 1, "{sink:?}");
    }
}

#[cfg(feature = "tracing")]
#[tokio::test]
async fn tracing_reporter_follows_a_run() {
    use crate::TracingReporter;

    for sink in SINKS {
        let summary = Orchestrator::new(config(20, 4, sink))
            .run(
                &mut source::from_fn(|i| i),
                recording_executor(Started::default(), instant, None),
                TracingReporter,
            )
            .await
            .expect("run failed");
        assert_eq!(summary.completed, 20);
    }
}
