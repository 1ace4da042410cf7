//! # Wardpost Core
//!
//! Shared foundation for the ward portal notification dispatcher:
//! error taxonomy, configuration, and the `Messenger` trait that the
//! dispatch jobs send through.

pub mod config;
pub mod error;
pub mod messenger;

pub use config::WardpostConfig;
pub use error::{Result, WardpostError};
pub use messenger::Messenger;
