//! The plan execution loop
//!
//! Each iteration re-reads the plan and prompt documents, stops if no phase
//! is pending, and otherwise hands the prompt to the agent backend and
//! streams its output. A failed run asks the operator whether to go on.

use std::path::Path;

use crate::agent::Backend;
use crate::config::HarnessPaths;
use crate::plan::{plan_status, PlanStatus};
use crate::{Error, Result};

use super::operator::{Decision, OperatorPrompt};
use super::report::HarnessObserver;

/// Inputs for one harness run
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Plan and prompt documents
    pub paths: HarnessPaths,
    /// Maximum number of agent invocations
    pub max_iterations: u32,
    /// Report pending phases and stop without invoking the agent
    pub status_only: bool,
}

/// Why the loop stopped. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No pending phases were left.
    AllComplete,
    /// Status-only mode reported the pending phases.
    StatusOnly { pending: usize },
    /// The iteration budget was used up. `remaining` is the pending count
    /// seen by the last scan, before the final run.
    IterationLimit { remaining: usize },
    /// The operator declined to continue after a failed run.
    Aborted { iteration: u32 },
}

/// Summary of a harness run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOutcome {
    /// Number of agent invocations performed
    pub iterations: u32,
    pub stop: StopReason,
}

enum LoopState {
    Checking,
    Reporting { pending: Vec<String>, prompt: String },
    AwaitingExternalCall { prompt: String },
    HandlingFailure,
    Done(StopReason),
}

/// Drive the agent over the plan until it is complete, the budget runs out,
/// or the operator gives up after a failure.
///
/// Only an unreadable plan or prompt document is returned as an error.
pub async fn run_harness<B, P, O>(
    options: &HarnessOptions,
    backend: &B,
    operator: &mut P,
    observer: &mut O,
) -> Result<HarnessOutcome>
where
    B: Backend + ?Sized,
    P: OperatorPrompt + ?Sized,
    O: HarnessObserver + ?Sized,
{
    let (status, _) = check(&options.paths).await?;
    observer.on_plan_status(&status);

    let initial_stop = if status.is_complete() {
        Some(StopReason::AllComplete)
    } else if options.status_only {
        Some(StopReason::StatusOnly {
            pending: status.pending.len(),
        })
    } else {
        None
    };

    if let Some(stop) = initial_stop {
        let outcome = HarnessOutcome {
            iterations: 0,
            stop,
        };
        observer.on_finish(&outcome);
        return Ok(outcome);
    }

    let mut iterations = 0u32;
    let mut last_pending = status.pending.len();
    let mut state = LoopState::Checking;

    let stop = loop {
        state = match state {
            LoopState::Checking => {
                if iterations >= options.max_iterations {
                    LoopState::Done(StopReason::IterationLimit {
                        remaining: last_pending,
                    })
                } else {
                    let (status, prompt) = check(&options.paths).await?;
                    last_pending = status.pending.len();
                    if status.is_complete() {
                        observer.on_all_complete();
                        LoopState::Done(StopReason::AllComplete)
                    } else {
                        LoopState::Reporting {
                            pending: status.pending,
                            prompt,
                        }
                    }
                }
            }
            LoopState::Reporting { pending, prompt } => {
                iterations += 1;
                tracing::info!(
                    iteration = iterations,
                    max = options.max_iterations,
                    next = %pending[0],
                    "Starting iteration"
                );
                observer.on_iteration_start(iterations, options.max_iterations, &pending);
                LoopState::AwaitingExternalCall { prompt }
            }
            LoopState::AwaitingExternalCall { prompt } => {
                observer.on_agent_start();
                match stream_agent(backend, &prompt, observer).await {
                    Ok(units) => {
                        tracing::debug!(units, "Agent run finished");
                        observer.on_agent_complete(units);
                        LoopState::Checking
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, iteration = iterations, "Agent run failed");
                        observer.on_agent_failed(&e);
                        LoopState::HandlingFailure
                    }
                }
            }
            LoopState::HandlingFailure => match operator.confirm_continue().await {
                Decision::Continue => LoopState::Checking,
                Decision::Abort => LoopState::Done(StopReason::Aborted {
                    iteration: iterations,
                }),
            },
            LoopState::Done(stop) => break stop,
        };
    };

    let outcome = HarnessOutcome { iterations, stop };
    tracing::info!(iterations, stop = ?outcome.stop, "Harness stopped");
    observer.on_finish(&outcome);
    Ok(outcome)
}

/// Read both documents and scan the plan
async fn check(paths: &HarnessPaths) -> Result<(PlanStatus, String)> {
    let plan = read_document(&paths.plan).await?;
    let prompt = read_document(&paths.prompt).await?;
    let status = plan_status(&plan);
    tracing::debug!(
        total = status.total,
        pending = status.pending.len(),
        "Scanned plan"
    );
    Ok((status, prompt))
}

async fn read_document(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Document {
            path: path.to_path_buf(),
            source,
        })
}

/// Run the agent once, forwarding every unit; returns the unit count
async fn stream_agent<B, O>(backend: &B, prompt: &str, observer: &mut O) -> Result<usize>
where
    B: Backend + ?Sized,
    O: HarnessObserver + ?Sized,
{
    let mut stream = backend.execute(prompt).await?;
    let mut count = 0;
    while let Some(unit) = stream.next_unit().await? {
        count += 1;
        observer.on_unit(count, &unit);
    }
    Ok(count)
}
