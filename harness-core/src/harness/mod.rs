//! Execution loop: re-scan the plan, run the agent, repeat

mod operator;
mod report;
mod runner;

pub use operator::{Decision, OperatorPrompt, StdinPrompt};
pub use report::{ConsoleReporter, HarnessObserver};
pub use runner::{run_harness, HarnessOptions, HarnessOutcome, StopReason};
