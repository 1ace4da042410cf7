//! # Wardpost Dispatch
//!
//! The dispatcher core: message composing, the recipient directory, and
//! the two notification jobs (group announcement, task reminders).
//!
//! Everything here is driven by injected collaborators — the store's read
//! trait and the `Messenger` send capability — so job behavior is fully
//! testable with fakes.

pub mod compose;
pub mod directory;
pub mod jobs;

pub use directory::{Directory, normalize_name};
pub use jobs::{Dispatcher, JobKind, Outcome, RunReport};
