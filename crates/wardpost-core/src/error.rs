//! Wardpost error taxonomy.
//!
//! Only `Config` is fatal (it stops the process before the scheduler loop
//! starts). `Store` and `Channel` are contained at the smallest scope by
//! the dispatch jobs: a failed read means "nothing to send this run", a
//! failed send ends that recipient's branch only.

use thiserror::Error;

/// All errors produced by wardpost crates.
#[derive(Debug, Error)]
pub enum WardpostError {
    /// The portal database could not be read.
    #[error("store error: {0}")]
    Store(String),

    /// The messaging channel reported a failure for one send.
    #[error("channel error: {0}")]
    Channel(String),

    /// Malformed configuration (schedule, directory, channel credentials).
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across all wardpost crates.
pub type Result<T> = std::result::Result<T, WardpostError>;
