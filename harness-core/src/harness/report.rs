//! Progress reporting for the execution loop

use crate::agent::ResponseUnit;
use crate::plan::PlanStatus;
use crate::Error;

use super::runner::{HarnessOutcome, StopReason};

/// Longest summary printed for a non-text unit
const SUMMARY_LIMIT: usize = 200;

const RULE: &str = "============================================================";

/// Receives progress events from the execution loop
pub trait HarnessObserver {
    /// Called after the initial plan scan
    fn on_plan_status(&mut self, _status: &PlanStatus) {}

    /// Called before each agent run
    fn on_iteration_start(&mut self, _iteration: u32, _max: u32, _pending: &[String]) {}

    /// Called when the agent is about to be invoked
    fn on_agent_start(&mut self) {}

    /// Called for every unit the agent yields, with its 1-based index
    fn on_unit(&mut self, index: usize, unit: &ResponseUnit);

    /// Called when the agent's stream ended normally
    fn on_agent_complete(&mut self, _units: usize) {}

    /// Called when the agent run failed
    fn on_agent_failed(&mut self, _error: &Error) {}

    /// Called when a re-scan finds nothing left to do
    fn on_all_complete(&mut self) {}

    /// Called once the loop has stopped
    fn on_finish(&mut self, _outcome: &HarnessOutcome) {}
}

/// Prints progress and agent output to the console
pub struct ConsoleReporter {
    /// Whether to print the final stop reason
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl HarnessObserver for ConsoleReporter {
    fn on_plan_status(&mut self, status: &PlanStatus) {
        if status.is_complete() {
            println!();
            println!("All phases are complete!");
            return;
        }

        println!();
        println!(
            "Remaining phases: {} ({} of {} done)",
            status.pending.len(),
            status.completed,
            status.total
        );
        for (i, phase) in status.pending.iter().enumerate() {
            println!("  {}. {}", i + 1, phase);
        }
    }

    fn on_iteration_start(&mut self, iteration: u32, max: u32, pending: &[String]) {
        println!();
        println!("[Iteration {}/{}]", iteration, max);
        if let Some(next) = pending.first() {
            println!("Remaining: {} - {}", pending.len(), next);
        }
    }

    fn on_agent_start(&mut self) {
        println!();
        println!("{}", RULE);
        println!("Running agent...");
        println!("{}", RULE);
        println!();
    }

    fn on_unit(&mut self, index: usize, unit: &ResponseUnit) {
        println!("{}", format_unit(index, unit));
    }

    fn on_agent_complete(&mut self, units: usize) {
        println!();
        println!("{}", format_tally(units));
    }

    fn on_agent_failed(&mut self, error: &Error) {
        println!();
        println!("{}", format_failure(error));
        eprintln!("{}", error.trace());
        println!();
        println!("Agent execution failed");
    }

    fn on_all_complete(&mut self) {
        println!();
        println!("{}", RULE);
        println!("All phases completed!");
        println!("{}", RULE);
    }

    fn on_finish(&mut self, outcome: &HarnessOutcome) {
        if self.verbose {
            match &outcome.stop {
                StopReason::AllComplete | StopReason::StatusOnly { .. } => {}
                StopReason::IterationLimit { remaining } => println!(
                    "\nIteration limit reached after {} run(s), {} phase(s) left",
                    outcome.iterations, remaining
                ),
                StopReason::Aborted { iteration } => {
                    println!("\nAborted by operator after iteration {}", iteration)
                }
            }
        }
        if prints_finish_line(outcome) {
            println!();
            println!("Execute harness finished");
        }
    }
}

/// Console line for one response unit
fn format_unit(index: usize, unit: &ResponseUnit) -> String {
    match unit {
        ResponseUnit::Text(text) => text.clone(),
        ResponseUnit::Other { kind, summary } => {
            format!("[{}] {}: {}", index, kind, truncate(summary, SUMMARY_LIMIT))
        }
    }
}

/// Message tally printed after a successful agent run
fn format_tally(units: usize) -> String {
    format!("Done: {} messages processed", units)
}

/// Headline printed for a failed agent run
fn format_failure(error: &Error) -> String {
    format!("Error: {}: {}", error.kind(), error)
}

/// Status-only runs and runs that found nothing to do end without the
/// closing line
fn prints_finish_line(outcome: &HarnessOutcome) -> bool {
    match outcome.stop {
        StopReason::StatusOnly { .. } => false,
        StopReason::AllComplete => outcome.iterations > 0,
        _ => true,
    }
}

/// Cut `s` to at most `limit` characters
fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_unchanged() {
        assert_eq!(truncate("hello", 200), "hello");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let s = "✅".repeat(10);
        assert_eq!(truncate(&s, 3), "✅✅✅");
    }

    #[test]
    fn test_format_text_unit_verbatim() {
        let unit = ResponseUnit::Text("line one\nline two".to_string());
        assert_eq!(format_unit(7, &unit), "line one\nline two");
    }

    #[test]
    fn test_format_other_unit() {
        let unit = ResponseUnit::Other {
            kind: "system".to_string(),
            summary: "init (session: abc)".to_string(),
        };
        assert_eq!(format_unit(3, &unit), "[3] system: init (session: abc)");
    }

    #[test]
    fn test_format_other_unit_caps_summary() {
        let unit = ResponseUnit::Other {
            kind: "raw".to_string(),
            summary: "x".repeat(250),
        };
        let line = format_unit(1, &unit);
        assert_eq!(line, format!("[1] raw: {}", "x".repeat(200)));
    }

    #[test]
    fn test_format_tally() {
        assert_eq!(format_tally(12), "Done: 12 messages processed");
    }

    #[test]
    fn test_format_failure() {
        let err = Error::Agent("exited with status 1".to_string());
        assert_eq!(
            format_failure(&err),
            "Error: Agent: Agent error: exited with status 1"
        );
    }

    #[test]
    fn test_finish_line_skipped_when_nothing_ran() {
        let outcome = |iterations, stop| HarnessOutcome { iterations, stop };

        assert!(!prints_finish_line(&outcome(0, StopReason::AllComplete)));
        assert!(!prints_finish_line(&outcome(0, StopReason::StatusOnly { pending: 2 })));
        assert!(prints_finish_line(&outcome(2, StopReason::AllComplete)));
        assert!(prints_finish_line(&outcome(
            20,
            StopReason::IterationLimit { remaining: 1 }
        )));
        assert!(prints_finish_line(&outcome(1, StopReason::Aborted { iteration: 1 })));
    }
}
