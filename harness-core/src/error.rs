//! Error types for the plan harness

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for harness operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required input document could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Agent execution error
    #[error("Agent error: {0}")]
    Agent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Short name of the error variant, used in failure reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "Io",
            Error::Document { .. } => "Document",
            Error::Agent(_) => "Agent",
            Error::Config(_) => "Config",
        }
    }

    /// Render the error followed by its chain of sources, one per line
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_variant() {
        assert_eq!(Error::Agent("boom".to_string()).kind(), "Agent");
        assert_eq!(Error::Config("x".to_string()).kind(), "Config");
    }

    #[test]
    fn test_document_error_trace_includes_source() {
        let err = Error::Document {
            path: PathBuf::from("plan.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let trace = err.trace();
        assert!(trace.starts_with("Failed to read plan.md"));
        assert!(trace.contains("caused by: no such file"));
    }
}
