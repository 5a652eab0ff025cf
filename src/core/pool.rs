//! The job pool: bounded parallelism, FIFO dispatch, per-job deadlines,
//! failure classification, and graceful shutdown.
//!
//! # Design
//!
//! - One supervisor thread per pool slot pulls jobs FIFO from a shared
//!   channel, so at most `max_workers` jobs execute concurrently.
//! - Each supervisor owns one [`WorkerUnit`] and waits on the job's reply
//!   with `recv_timeout(job_timeout)`. A fired deadline resolves the outcome
//!   immediately, abandons the unit, and spawns a replacement; a late reply
//!   from the abandoned unit lands on a dropped channel and cannot alter the
//!   resolved outcome.
//! - Shutdown closes intake by dropping the job sender; supervisors drain
//!   the queue resolving still-pending jobs with a shutdown failure, then
//!   exit. No job is silently dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::parser::DocumentParser;

use super::error::{JobError, PoolError};
use super::job::{Job, JobHandle, Outcome, OutcomeSlot};
use super::worker::WorkerUnit;

/// Snapshot of pool utilization and lifetime counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolStats {
    /// Configured number of pool slots.
    pub workers: usize,
    /// Jobs currently executing on worker units.
    pub active_jobs: u64,
    /// Jobs waiting in the FIFO queue.
    pub queued_jobs: u64,
    /// Total jobs accepted by `submit`.
    pub submitted_jobs: u64,
    /// Total jobs that resolved with a document.
    pub completed_jobs: u64,
    /// Total jobs that resolved with a failure (worker death, parse error,
    /// shutdown).
    pub failed_jobs: u64,
    /// Total jobs that hit the deadline.
    pub timed_out_jobs: u64,
    /// Worker units torn down and replaced after a timeout or death.
    pub workers_replaced: u64,
}

/// Lock-free counters behind [`PoolStats`].
#[derive(Debug, Default)]
struct PoolCounters {
    active_jobs: AtomicU64,
    queued_jobs: AtomicU64,
    submitted_jobs: AtomicU64,
    completed_jobs: AtomicU64,
    failed_jobs: AtomicU64,
    timed_out_jobs: AtomicU64,
    workers_replaced: AtomicU64,
}

impl PoolCounters {
    fn snapshot(&self, workers: usize) -> PoolStats {
        PoolStats {
            workers,
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            queued_jobs: self.queued_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
            timed_out_jobs: self.timed_out_jobs.load(Ordering::Relaxed),
            workers_replaced: self.workers_replaced.load(Ordering::Relaxed),
        }
    }
}

/// Queue entry: the job plus its resolution slot.
struct QueuedJob {
    job: Job,
    outcome: OutcomeSlot,
}

/// Owns a fixed set of worker units and the job scheduling, deadline, and
/// outcome-classification logic.
///
/// Construct one pool at startup and pass it to the request layer; there is
/// no ambient global instance. The pool is not generic over the parser: the
/// parser type is only needed at construction, where each supervisor takes
/// its own clone.
pub struct JobPool {
    config: PoolConfig,
    /// Job sender. `None` once shutdown has begun; dropping it is what lets
    /// supervisors drain out and exit.
    job_tx: Mutex<Option<Sender<QueuedJob>>>,
    counters: Arc<PoolCounters>,
    shutdown: Arc<AtomicBool>,
    supervisors: Mutex<Vec<JoinHandle<()>>>,
}

impl JobPool {
    /// Create a pool and spawn its supervisor threads, each owning one
    /// worker unit running `parser`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new<P: DocumentParser>(config: PoolConfig, parser: P) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let (job_tx, job_rx) = match config.queue_depth {
            Some(depth) => bounded::<QueuedJob>(depth),
            None => unbounded::<QueuedJob>(),
        };
        let counters = Arc::new(PoolCounters::default());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut supervisors = Vec::with_capacity(config.max_workers);
        for slot in 0..config.max_workers {
            supervisors.push(spawn_supervisor(
                slot,
                job_rx.clone(),
                Arc::clone(&counters),
                Arc::clone(&shutdown),
                parser.clone(),
                config.clone(),
            ));
        }

        info!(
            max_workers = config.max_workers,
            job_timeout = ?config.job_timeout,
            queue_depth = ?config.queue_depth,
            "job pool started"
        );

        Ok(Self {
            config,
            job_tx: Mutex::new(Some(job_tx)),
            counters,
            shutdown,
            supervisors: Mutex::new(supervisors),
        })
    }

    /// Enqueue a job. Dispatch is FIFO: the job runs as soon as a worker
    /// unit is idle. The enqueue itself never blocks.
    ///
    /// # Errors
    ///
    /// - [`PoolError::PoolShutdown`] once shutdown has begun.
    /// - [`PoolError::QueueFull`] when a bounded queue depth is configured
    ///   and exhausted.
    pub fn submit(&self, input: impl Into<String>) -> Result<JobHandle, PoolError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }

        let job = Job::new(input.into());
        let job_id = job.id;
        let (outcome, outcome_rx) = OutcomeSlot::new();

        let guard = self.job_tx.lock();
        let Some(job_tx) = guard.as_ref() else {
            return Err(PoolError::PoolShutdown);
        };

        match job_tx.try_send(QueuedJob { job, outcome }) {
            Ok(()) => {
                self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                self.counters.queued_jobs.fetch_add(1, Ordering::Relaxed);
                debug!(job_id = %job_id, "job submitted");
                Ok(JobHandle::new(job_id, outcome_rx))
            }
            Err(TrySendError::Full(_)) => {
                warn!(job_id = %job_id, "job queue is full, rejecting submission");
                Err(PoolError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(PoolError::PoolShutdown),
        }
    }

    /// Current counter snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.config.max_workers)
    }

    /// Stop accepting jobs, wait for in-flight work, and tear the pool down.
    ///
    /// Queued jobs that never ran resolve with
    /// [`JobError::PoolShutdown`]; in-flight jobs get up to their deadline.
    /// Each supervisor is joined for at most `shutdown_grace`; stragglers
    /// are detached. Idempotent.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("shutting down job pool");

        // Close intake. Supervisors drain what is already queued, resolving
        // those jobs as shutdown failures, then exit.
        {
            let mut job_tx = self.job_tx.lock();
            *job_tx = None;
        }

        let mut supervisors = self.supervisors.lock();
        for (slot, supervisor) in supervisors.drain(..).enumerate() {
            let (done_tx, done_rx) = std::sync::mpsc::channel();
            let joiner = thread::spawn(move || {
                let clean = supervisor.join().is_ok();
                let _ = done_tx.send(clean);
            });

            match done_rx.recv_timeout(self.config.shutdown_grace) {
                Ok(clean) => {
                    let _ = joiner.join();
                    if clean {
                        debug!(slot, "supervisor joined");
                    } else {
                        warn!(slot, "supervisor panicked during shutdown");
                    }
                }
                Err(_) => {
                    // Detach the joiner; the supervisor finishes its current
                    // job (bounded by the deadline) and exits on its own.
                    warn!(slot, "supervisor did not exit within grace period, detaching");
                }
            }
        }

        info!("job pool shut down");
    }
}

impl Drop for JobPool {
    fn drop(&mut self) {
        // Signal and close intake, but do not join: detached supervisors
        // still drain the queue so no job resolution is lost.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            let mut job_tx = self.job_tx.lock();
            *job_tx = None;
            debug!("job pool dropped without explicit shutdown, supervisors detached");
        }
    }
}

fn spawn_supervisor<P: DocumentParser>(
    slot: usize,
    job_rx: Receiver<QueuedJob>,
    counters: Arc<PoolCounters>,
    shutdown: Arc<AtomicBool>,
    parser: P,
    config: PoolConfig,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("parse-supervisor-{slot}"))
        .spawn(move || supervisor_loop(slot, &job_rx, &counters, &shutdown, &parser, &config))
        .expect("failed to spawn supervisor thread")
}

/// One pool slot: pull jobs, run them on the owned worker unit, classify
/// the result, resolve exactly one outcome per job.
fn supervisor_loop<P: DocumentParser>(
    slot: usize,
    job_rx: &Receiver<QueuedJob>,
    counters: &PoolCounters,
    shutdown: &AtomicBool,
    parser: &P,
    config: &PoolConfig,
) {
    let mut worker = WorkerUnit::spawn(slot, 0, config.thread_stack_size, parser.clone());

    // recv fails only when the queue is empty and intake is closed.
    while let Ok(queued) = job_rx.recv() {
        counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);

        if shutdown.load(Ordering::Acquire) {
            warn!(job_id = %queued.job.id, slot, "resolving queued job as pool shutdown");
            counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
            queued.outcome.resolve(Outcome::Failure(JobError::PoolShutdown));
            continue;
        }

        let QueuedJob { job, outcome } = queued;
        let job_id = job.id;
        counters.active_jobs.fetch_add(1, Ordering::Relaxed);
        debug!(
            job_id = %job_id,
            slot,
            generation = worker.generation(),
            queued_for = ?job.submitted_at.elapsed(),
            "dispatching job"
        );

        let started = Instant::now();
        let resolved = match worker.dispatch(job.input) {
            Err(_gone) => {
                // The unit died between jobs. Replace it and fail this job.
                error!(job_id = %job_id, slot, "worker unit was gone before dispatch, replacing it");
                counters.workers_replaced.fetch_add(1, Ordering::Relaxed);
                worker = worker.replace(config.thread_stack_size, parser.clone());
                Outcome::Failure(JobError::WorkerDied {
                    detail: "worker execution context terminated before the job started".into(),
                })
            }
            Ok(reply_rx) => match reply_rx.recv_timeout(config.job_timeout) {
                Ok(Ok(document)) => {
                    info!(
                        job_id = %job_id,
                        slot,
                        sections = document.sections.len(),
                        elapsed = ?started.elapsed(),
                        "job completed"
                    );
                    Outcome::Success(document)
                }
                Ok(Err(parse_err)) => {
                    warn!(job_id = %job_id, slot, error = %parse_err, "job failed in parser");
                    Outcome::Failure(JobError::Parse {
                        detail: parse_err.to_string(),
                    })
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Deadline wins. Abandon the (possibly hung) unit; it
                    // may keep consuming resources until its current call
                    // returns, then exits against closed channels.
                    warn!(
                        job_id = %job_id,
                        slot,
                        timeout = ?config.job_timeout,
                        "job deadline fired, replacing worker unit"
                    );
                    counters.workers_replaced.fetch_add(1, Ordering::Relaxed);
                    worker = worker.replace(config.thread_stack_size, parser.clone());
                    Outcome::Timeout(config.job_timeout)
                }
                Err(RecvTimeoutError::Disconnected) => {
                    error!(job_id = %job_id, slot, "worker unit died mid-job, replacing it");
                    counters.workers_replaced.fetch_add(1, Ordering::Relaxed);
                    worker = worker.replace(config.thread_stack_size, parser.clone());
                    Outcome::Failure(JobError::WorkerDied {
                        detail: "worker execution context terminated abnormally".into(),
                    })
                }
            },
        };

        counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
        match &resolved {
            Outcome::Success(_) => counters.completed_jobs.fetch_add(1, Ordering::Relaxed),
            Outcome::Timeout(_) => counters.timed_out_jobs.fetch_add(1, Ordering::Relaxed),
            Outcome::Failure(_) => counters.failed_jobs.fetch_add(1, Ordering::Relaxed),
        };

        if !outcome.resolve(resolved) {
            debug!(job_id = %job_id, "outcome already resolved, discarding");
        }
    }

    debug!(slot, "supervisor exiting");
}
