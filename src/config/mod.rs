//! Configuration models for the pool and its timeouts.

pub mod pool;

pub use pool::PoolConfig;
