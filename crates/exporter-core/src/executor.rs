//! Bounded worker pool that runs a batch of jobs and reports each outcome
//! as it completes.
//!
//! All jobs are placed in a [`WorkQueue`] before any worker starts, so
//! submission never blocks. `min(max_workers, jobs)` scoped threads claim jobs
//! from the queue and push completions over a channel; the calling thread
//! consumes them in completion order, dispatching `on_success`/`on_failure`
//! followed by `on_progress` for every job.
//!
//! Cancellation is cooperative: the shared [`CancellationToken`] is handed to
//! every work function, which is expected to skip its side effects once the
//! token is poisoned. The engine poisons it when the interrupt flag is raised
//! or when a callback or job turns out to be defective.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::shutdown::{InterruptFlag, is_interrupted};
use crate::work_queue::WorkQueue;

/// How often the control thread re-checks the interrupt flag while waiting
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

type WorkFn<'a, J, T, E> = dyn Fn(&J, &CancellationToken) -> Result<T, E> + Send + Sync + 'a;
type SuccessFn<'a, T> = dyn FnMut(T) -> anyhow::Result<()> + 'a;
type FailureFn<'a, J, E> = dyn FnMut(E, &J) -> anyhow::Result<()> + 'a;
type ProgressFn<'a> = dyn FnMut() + 'a;

/// Reason a batch run stopped early
#[derive(Debug)]
pub enum RunError {
    /// The interrupt flag was raised while jobs were outstanding
    Interrupted,
    /// `on_success` or `on_failure` returned an error
    Callback(anyhow::Error),
    /// A work function panicked (only under `panic = "unwind"`; release builds abort)
    JobPanicked(String),
    /// The worker pool could not run the batch to completion
    Pool(String),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interrupted => write!(f, "run interrupted"),
            Self::Callback(e) => write!(f, "job callback failed: {e:#}"),
            Self::JobPanicked(msg) => write!(f, "job panicked: {msg}"),
            Self::Pool(msg) => write!(f, "worker pool failure: {msg}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Callback(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Counts of delivered outcomes for a completed run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }
}

enum Completion<'j, J, T, E> {
    Finished(&'j J, Result<T, E>),
    Panicked(String),
}

/// Runs batches of jobs on a fixed-size worker pool.
///
/// ```ignore
/// let mut executor = JobExecutor::new(|job: &u32, _token| Ok::<_, String>(*job * 2))
///     .max_workers(4)
///     .on_success(|v| { println!("{v}"); Ok(()) })
///     .on_progress(|| bar.inc(1));
/// executor.run(vec![1, 2, 3])?;
/// ```
pub struct JobExecutor<'a, J, T, E> {
    work: Box<WorkFn<'a, J, T, E>>,
    max_workers: usize,
    on_success: Box<SuccessFn<'a, T>>,
    on_failure: Box<FailureFn<'a, J, E>>,
    on_progress: Box<ProgressFn<'a>>,
    token: CancellationToken,
    interrupt: Option<InterruptFlag>,
}

impl<'a, J, T, E> JobExecutor<'a, J, T, E>
where
    J: Sync,
    T: Send,
    E: Send,
{
    /// Create an executor with one worker and no-op callbacks
    pub fn new(work: impl Fn(&J, &CancellationToken) -> Result<T, E> + Send + Sync + 'a) -> Self {
        Self {
            work: Box::new(work),
            max_workers: 1,
            on_success: Box::new(|_| Ok(())),
            on_failure: Box::new(|_, _| Ok(())),
            on_progress: Box::new(|| {}),
            token: CancellationToken::new(),
            interrupt: None,
        }
    }

    /// Pool size (clamped to at least 1)
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn on_success(mut self, f: impl FnMut(T) -> anyhow::Result<()> + 'a) -> Self {
        self.on_success = Box::new(f);
        self
    }

    pub fn on_failure(mut self, f: impl FnMut(E, &J) -> anyhow::Result<()> + 'a) -> Self {
        self.on_failure = Box::new(f);
        self
    }

    /// Called once per completed job, after its success/failure callback
    pub fn on_progress(mut self, f: impl FnMut() + 'a) -> Self {
        self.on_progress = Box::new(f);
        self
    }

    /// Share an existing token instead of the executor's own
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Stop the run when this flag is raised
    pub fn interrupt_flag(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Run every job and deliver outcomes as they complete.
    ///
    /// Returns once all jobs have reported, or early with [`RunError`] on
    /// interrupt or a defective callback/job. In both cases the worker pool has
    /// been joined before this returns.
    pub fn run(&mut self, jobs: Vec<J>) -> Result<RunStats, RunError> {
        let queue = WorkQueue::new(jobs);
        let total = queue.total();
        if total == 0 {
            return Ok(RunStats::default());
        }

        let Self {
            work,
            max_workers,
            on_success,
            on_failure,
            on_progress,
            token,
            interrupt,
        } = self;
        let work: &WorkFn<'a, J, T, E> = &**work;
        let token: &CancellationToken = token;
        let mut dispatch = Dispatch {
            on_success: &mut **on_success,
            on_failure: &mut **on_failure,
            on_progress: &mut **on_progress,
            interrupt: interrupt.as_deref(),
        };

        let workers = (*max_workers).min(total);
        let halted = AtomicBool::new(false);
        log::debug!("Running {total} jobs with {workers} workers");

        thread::scope(|s| {
            let (tx, rx) = mpsc::channel::<Completion<'_, J, T, E>>();
            for idx in 0..workers {
                let tx = tx.clone();
                let (queue, halted) = (&queue, &halted);
                let spawned = thread::Builder::new()
                    .name(format!("job-worker-{idx}"))
                    .spawn_scoped(s, move || {
                        while !halted.load(Ordering::Acquire) {
                            let Some(job) = queue.next() else { break };
                            let completion =
                                match panic::catch_unwind(AssertUnwindSafe(|| work(job, token))) {
                                    Ok(result) => Completion::Finished(job, result),
                                    Err(payload) => Completion::Panicked(panic_message(&*payload)),
                                };
                            if tx.send(completion).is_err() {
                                break;
                            }
                        }
                    });
                if let Err(e) = spawned {
                    // Remaining workers (if any) still drain the queue
                    log::error!("Failed to spawn worker {idx}: {e}");
                }
            }
            drop(tx);

            let result = dispatch.collect(&rx, total);
            if result.is_err() {
                halted.store(true, Ordering::Release);
                token.poison();
            }
            // rx drops here so late senders give up; the scope joins all workers
            result
        })
    }
}

/// Control-thread side of a run: callbacks plus the interrupt source
struct Dispatch<'c, 'a, J, T, E> {
    on_success: &'c mut SuccessFn<'a, T>,
    on_failure: &'c mut FailureFn<'a, J, E>,
    on_progress: &'c mut ProgressFn<'a>,
    interrupt: Option<&'c AtomicBool>,
}

impl<J, T, E> Dispatch<'_, '_, J, T, E> {
    fn collect(
        &mut self,
        rx: &mpsc::Receiver<Completion<'_, J, T, E>>,
        total: usize,
    ) -> Result<RunStats, RunError> {
        let mut stats = RunStats::default();
        while stats.completed() < total {
            if self.interrupt.is_some_and(is_interrupted) {
                log::warn!(
                    "Interrupt received, shutting down ({} of {total} jobs completed)",
                    stats.completed()
                );
                return Err(RunError::Interrupted);
            }

            let completion = match rx.recv_timeout(INTERRUPT_POLL) {
                Ok(c) => c,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(RunError::Pool(format!(
                        "workers exited with {} of {total} jobs outstanding",
                        total - stats.completed()
                    )));
                }
            };

            let delivered = match completion {
                Completion::Finished(_, Ok(value)) => {
                    stats.succeeded += 1;
                    (self.on_success)(value).map_err(RunError::Callback)
                }
                Completion::Finished(job, Err(e)) => {
                    stats.failed += 1;
                    (self.on_failure)(e, job).map_err(RunError::Callback)
                }
                Completion::Panicked(msg) => {
                    stats.failed += 1;
                    Err(RunError::JobPanicked(msg))
                }
            };
            // Progress is accounted before any defect escalates
            (self.on_progress)();
            delivered?;
        }
        Ok(stats)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
