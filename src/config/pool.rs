//! Pool configuration.

use std::time::Duration;

/// Stack size for worker threads; large documents can produce deep parse
/// recursion in some parsers, so the default is generous.
const DEFAULT_THREAD_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Immutable pool configuration. Built once at startup; there is no dynamic
/// reconfiguration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of pool slots, each one worker unit. Must be at least 1.
    pub max_workers: usize,
    /// Wall-clock deadline enforced per dispatched job.
    pub job_timeout: Duration,
    /// Optional bound on the job queue. `None` queues unboundedly in FIFO
    /// arrival order; `Some(n)` rejects submissions once `n` jobs wait.
    pub queue_depth: Option<usize>,
    /// Stack size for worker unit threads.
    pub thread_stack_size: usize,
    /// How long `shutdown` waits for each supervisor before detaching it.
    pub shutdown_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 1,
            job_timeout: Duration::from_secs(120),
            queue_depth: None,
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

impl PoolConfig {
    /// Configuration with the service defaults: one worker, 120 second
    /// deadline, unbounded queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of pool slots.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the per-job deadline.
    #[must_use]
    pub fn with_job_timeout(mut self, job_timeout: Duration) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    /// Bound the job queue (the default is unbounded).
    #[must_use]
    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = Some(queue_depth);
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Set the per-supervisor shutdown grace period.
    #[must_use]
    pub fn with_shutdown_grace(mut self, shutdown_grace: Duration) -> Self {
        self.shutdown_grace = shutdown_grace;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.job_timeout.is_zero() {
            return Err("job_timeout must be greater than 0".into());
        }
        if self.queue_depth == Some(0) {
            return Err("queue_depth must be greater than 0 when bounded".into());
        }
        if self.thread_stack_size < 128 * 1024 {
            return Err("thread_stack_size must be at least 128 KiB".into());
        }
        Ok(())
    }
}
