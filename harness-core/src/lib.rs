//! Harness Core - Core library for the plan-harness execution loop
//!
//! This crate scans a plan document for pending phase markers and drives an
//! external coding agent over them, one iteration at a time, until every
//! phase is complete or the iteration budget runs out.

pub mod agent;
pub mod config;
pub mod error;
pub mod harness;
pub mod plan;

pub use agent::{Backend, ClaudeBackend, ResponseStream, ResponseUnit};
pub use config::{AgentConfig, Config, ConfigOverrides, HarnessConfig, HarnessPaths};
pub use error::{Error, Result};
pub use harness::{
    run_harness, ConsoleReporter, Decision, HarnessObserver, HarnessOptions, HarnessOutcome,
    OperatorPrompt, StdinPrompt, StopReason,
};
pub use plan::{pending_phases, plan_status, scan_markers, PhaseMarker, PlanStatus};
