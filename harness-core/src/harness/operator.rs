//! Operator confirmation after a failed agent run

use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// The operator's answer to "continue after a failure?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Abort,
}

impl Decision {
    /// Interpret a typed answer; only `y` (any case, surrounding whitespace
    /// ignored) continues
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("y") {
            Decision::Continue
        } else {
            Decision::Abort
        }
    }
}

/// Source of continue/abort decisions
#[async_trait]
pub trait OperatorPrompt: Send {
    /// Ask whether to keep going. Must resolve to `Abort` when no answer
    /// can be obtained.
    async fn confirm_continue(&mut self) -> Decision;
}

/// Asks on stdout and reads one line from stdin
pub struct StdinPrompt {
    reader: BufReader<Stdin>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorPrompt for StdinPrompt {
    async fn confirm_continue(&mut self) -> Decision {
        print!("Continue? (y/n): ");
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        match self.reader.read_line(&mut answer).await {
            Ok(0) => {
                tracing::debug!("No operator input available, aborting");
                Decision::Abort
            }
            Ok(_) => Decision::from_answer(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read operator input, aborting");
                Decision::Abort
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_continues() {
        assert_eq!(Decision::from_answer("y"), Decision::Continue);
        assert_eq!(Decision::from_answer("Y\n"), Decision::Continue);
        assert_eq!(Decision::from_answer("  y  \r\n"), Decision::Continue);
    }

    #[test]
    fn test_anything_else_aborts() {
        assert_eq!(Decision::from_answer("n"), Decision::Abort);
        assert_eq!(Decision::from_answer("yes"), Decision::Abort);
        assert_eq!(Decision::from_answer(""), Decision::Abort);
        assert_eq!(Decision::from_answer("\n"), Decision::Abort);
    }
}
