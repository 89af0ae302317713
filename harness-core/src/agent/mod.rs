//! Agent module for running the external coding agent

mod backends;
mod output;
mod spawn;

pub use backends::{Backend, ClaudeBackend, ClaudeStream, ResponseStream};
pub use output::{parse_line, OutputStreamer, ResponseUnit, StreamMessage};
pub use spawn::AgentHandle;
