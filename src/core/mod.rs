//! Job execution core: pool, worker units, outcomes, and their errors.

pub mod error;
pub mod job;
pub mod pool;
mod worker;

pub use error::{JobError, PoolError};
pub use job::{Job, JobHandle, JobId, Outcome};
pub use pool::{JobPool, PoolStats};
