//! # wikitext-server
//!
//! A wikitext parsing service built around a bounded pool of isolated,
//! timeout-enforced workers.
//!
//! Parsing unstructured markup is synchronous, can run arbitrarily long, and
//! can eat arbitrary memory on adversarial input. The service keeps that
//! from stalling or crashing request handling by running every job on a
//! dedicated worker thread supervised by the pool:
//!
//! - **Bounded parallelism**: at most `max_workers` jobs execute at once;
//!   excess submissions queue FIFO.
//! - **Per-job deadline**: a job that outlives `job_timeout` resolves as a
//!   timeout immediately; the hung worker is abandoned and replaced, and a
//!   late result from it cannot overwrite the resolved outcome.
//! - **Failure classification**: timeout, worker death, and parser error
//!   are distinct outcomes, mapped to distinct HTTP statuses.
//! - **No silent drops**: every submitted job resolves exactly once, even
//!   through shutdown.
//!
//! ```rust,no_run
//! use wikitext_server::config::PoolConfig;
//! use wikitext_server::core::{JobPool, Outcome};
//! use wikitext_server::parser::WikitextParser;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), wikitext_server::core::PoolError> {
//! let pool = JobPool::new(
//!     PoolConfig::new()
//!         .with_max_workers(4)
//!         .with_job_timeout(Duration::from_secs(120)),
//!     WikitextParser::new(),
//! )?;
//!
//! let handle = pool.submit("== Title ==\nBody text")?;
//! match handle.outcome().await {
//!     Outcome::Success(doc) => println!("{} sections", doc.sections.len()),
//!     Outcome::Timeout(after) => eprintln!("gave up after {after:?}"),
//!     Outcome::Failure(err) => eprintln!("failed: {err}"),
//! }
//! # Ok(())
//! # }
//! ```

/// Configuration models for the pool.
pub mod config;
/// Job pool, worker units, outcomes, and errors.
pub mod core;
/// Document parser seam and the default wikitext implementation.
pub mod parser;
/// HTTP boundary.
pub mod server;
/// Shared utilities.
pub mod util;
