//! Job identity, outcomes, and the first-writer-wins resolution slot.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::parser::ParsedDocument;

use super::error::JobError;

/// Unique identifier assigned to a job at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One parse request, owned by the pool from submission until its outcome is
/// produced. Never mutated after creation.
#[derive(Debug)]
pub struct Job {
    /// Identifier used in logs and handles.
    pub id: JobId,
    /// Raw markup payload.
    pub input: String,
    /// Submission timestamp, used to report queue wait on dispatch.
    pub submitted_at: Instant,
}

impl Job {
    pub(crate) fn new(input: String) -> Self {
        Self {
            id: JobId::new(),
            input,
            submitted_at: Instant::now(),
        }
    }
}

/// Final, immutable result of a job. Produced exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The parser completed and returned a structured document.
    Success(ParsedDocument),
    /// The deadline fired before the worker completed; carries the enforced
    /// timeout duration.
    Timeout(Duration),
    /// The job failed; see [`JobError`] for the classification.
    Failure(JobError),
}

/// Single-use resolution slot shared between the supervisor that runs a job
/// and the pool paths that may fail it (shutdown draining).
///
/// Exactly one of {completion, timeout, crash detection, shutdown} may win
/// the race to resolve a job; the first caller to take the sender wins and
/// later resolutions are discarded.
#[derive(Clone)]
pub(crate) struct OutcomeSlot {
    tx: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

impl OutcomeSlot {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Resolve the job's outcome. Returns `false` if it was already resolved,
    /// in which case `outcome` is discarded.
    pub(crate) fn resolve(&self, outcome: Outcome) -> bool {
        match self.tx.lock().take() {
            Some(tx) => {
                // The caller may have dropped the handle; the outcome is
                // still considered resolved.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

/// Handle to a pending outcome, returned by
/// [`JobPool::submit`](super::JobPool::submit).
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    rx: oneshot::Receiver<Outcome>,
}

impl JobHandle {
    pub(crate) fn new(id: JobId, rx: oneshot::Receiver<Outcome>) -> Self {
        Self { id, rx }
    }

    /// Identifier of the submitted job.
    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Await the job's outcome without blocking unrelated in-flight work.
    ///
    /// The wait is bounded: the pool resolves every dispatched job at its
    /// deadline at the latest, and shutdown resolves everything still queued.
    /// A torn-down pool that never resolved the slot maps to a
    /// [`JobError::PoolShutdown`] failure.
    pub async fn outcome(self) -> Outcome {
        self.rx
            .await
            .unwrap_or(Outcome::Failure(JobError::PoolShutdown))
    }
}
