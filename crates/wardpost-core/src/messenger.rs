//! The `Messenger` trait — the send capability the dispatch jobs drive.
//!
//! A messenger delivers one text to one addressable identity. The contract
//! deliberately mirrors how the external surface behaves: `send` may be
//! slow (the implementation waits internally for the surface to become
//! ready) and a returned `Ok` means only "the operation completed", never
//! a delivery receipt.

use async_trait::async_trait;

use crate::error::Result;

/// Send capability for one messaging surface.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Channel name, for logs.
    fn name(&self) -> &str;

    /// Verify credentials / reachability. Called once at startup.
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Deliver `text` to `target`. Any readiness waiting (page load,
    /// post-send settle) happens inside the implementation.
    async fn send(&self, target: &str, text: &str) -> Result<()>;
}
