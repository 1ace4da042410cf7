//! Console messenger — prints instead of sending.
//!
//! Used by the `--dry-run` flag so operators can check what a job would
//! deliver without touching the real channel.

use async_trait::async_trait;
use wardpost_core::error::Result;
use wardpost_core::messenger::Messenger;

/// A `Messenger` that writes each message to stdout.
#[derive(Debug, Default)]
pub struct ConsoleMessenger;

impl ConsoleMessenger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Messenger for ConsoleMessenger {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, target: &str, text: &str) -> Result<()> {
        println!("──── to: {target} ────");
        println!("{text}");
        println!("────────────────────");
        Ok(())
    }
}
