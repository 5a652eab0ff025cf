//! Error types for the job pool and job outcomes.

use thiserror::Error;

/// Terminal failure of a job, as classified by the pool.
///
/// The pool checks the failure classes in a fixed precedence order: a fired
/// deadline wins over everything (and resolves the outcome as
/// [`Outcome::Timeout`](super::Outcome::Timeout), not as a `JobError`), then
/// abnormal worker termination, then an application-level parser error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The worker's execution context terminated abnormally, typically from
    /// resource exhaustion or a panic inside the transformation.
    #[error("worker died: {detail}")]
    WorkerDied {
        /// Generic indication of what was observed; never a stack trace.
        detail: String,
    },

    /// The worker stayed alive but the document parser returned an error.
    #[error("parse error: {detail}")]
    Parse {
        /// Message reported by the parser.
        detail: String,
    },

    /// The pool shut down before the job could run.
    #[error("pool has been shut down")]
    PoolShutdown,
}

/// Errors surfaced at submission time, before a job enters the queue.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A bounded queue depth is configured and the queue is full.
    #[error("job queue is full")]
    QueueFull,

    /// The pool no longer accepts jobs.
    #[error("pool has been shut down")]
    PoolShutdown,

    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
