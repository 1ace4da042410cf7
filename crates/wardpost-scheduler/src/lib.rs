//! # Wardpost Scheduler
//!
//! Maps wall-clock time to job invocation. A coarse poll loop compares the
//! local time of day against a fixed table of `HH:MM` → job bindings and
//! runs due jobs synchronously, one at a time. A long-running job can push
//! a later binding past its minute — accepted, since only one job is ever
//! meant to be active.

pub mod engine;
pub mod timetable;

pub use engine::run_loop;
pub use timetable::Timetable;
