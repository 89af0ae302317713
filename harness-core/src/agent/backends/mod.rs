//! Backend abstraction for AI coding agents

use async_trait::async_trait;

use crate::Result;

use super::output::ResponseUnit;

mod claude;

pub use claude::{ClaudeBackend, ClaudeStream};

/// A single-pass sequence of response units from one agent run
#[async_trait]
pub trait ResponseStream: Send {
    /// Wait for the next unit; `None` once the run has finished successfully
    async fn next_unit(&mut self) -> Result<Option<ResponseUnit>>;
}

/// Trait for AI coding backends
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Start a run with the given prompt and return its output stream
    async fn execute(&self, prompt: &str) -> Result<Box<dyn ResponseStream>>;

    /// Check if this backend is available on the system
    fn is_available(&self) -> bool;
}
