//! Phase marker scanner for plan documents

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Glyph that marks a phase heading as done
pub const COMPLETION_GLYPH: &str = "✅";

/// Heading prefix of a phase marker line
const MARKER_PREFIX: &str = "####";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^####\s+Phase\s+(\d+-\d+)").expect("phase marker pattern is valid")
});

/// A phase heading found in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMarker {
    /// Phase identifier (e.g., "1-2")
    pub id: String,
    /// Heading text without the `####` prefix (e.g., "Phase 1-2 Build")
    pub text: String,
    /// Whether the heading carries the completion glyph
    pub complete: bool,
}

/// Summary of a plan's phase markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStatus {
    /// Number of phase markers in the plan
    pub total: usize,
    /// Number of markers carrying the completion glyph
    pub completed: usize,
    /// Pending marker texts in document order
    pub pending: Vec<String>,
}

impl PlanStatus {
    /// Whether no phases remain
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Scan every phase marker in the document, in order
pub fn scan_markers(content: &str) -> Vec<PhaseMarker> {
    content.lines().filter_map(parse_marker).collect()
}

/// Texts of the markers that are not yet complete, in document order
pub fn pending_phases(content: &str) -> Vec<String> {
    scan_markers(content)
        .into_iter()
        .filter(|m| !m.complete)
        .map(|m| m.text)
        .collect()
}

/// Count markers and collect the pending ones
pub fn plan_status(content: &str) -> PlanStatus {
    let markers = scan_markers(content);
    let completed = markers.iter().filter(|m| m.complete).count();

    PlanStatus {
        total: markers.len(),
        completed,
        pending: markers
            .into_iter()
            .filter(|m| !m.complete)
            .map(|m| m.text)
            .collect(),
    }
}

fn parse_marker(line: &str) -> Option<PhaseMarker> {
    let caps = MARKER_RE.captures(line)?;
    let text = line
        .trim()
        .strip_prefix(MARKER_PREFIX)
        .unwrap_or(line)
        .trim()
        .to_string();

    Some(PhaseMarker {
        id: caps[1].to_string(),
        text,
        complete: line.contains(COMPLETION_GLYPH),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PLAN: &str = "# Project Plan

## Next steps

#### Phase 1-1 Setup
Install the toolchain.

#### Phase 1-2 Build ✅
Done last week.

### Phase 2-1 Too shallow
##### Phase 2-2 Too deep

#### Phase 2-3 Deploy
";

    #[test]
    fn test_example_plan() {
        let doc = "#### Phase 1-1 Setup\n#### Phase 1-2 Build ✅\n";
        assert_eq!(pending_phases(doc), vec!["Phase 1-1 Setup"]);
    }

    #[test]
    fn test_pending_in_document_order() {
        assert_eq!(
            pending_phases(SAMPLE_PLAN),
            vec!["Phase 1-1 Setup", "Phase 2-3 Deploy"]
        );
    }

    #[test]
    fn test_wrong_heading_depth_ignored() {
        let markers = scan_markers(SAMPLE_PLAN);
        let ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1-1", "1-2", "2-3"]);
    }

    #[test]
    fn test_glyph_anywhere_marks_complete() {
        let doc = "#### Phase 3-1 ✅ Migrate\n#### Phase 3-2 Cleanup (see notes ✅)\n";
        assert!(pending_phases(doc).is_empty());
        assert!(scan_markers(doc).iter().all(|m| m.complete));
    }

    #[test]
    fn test_empty_document() {
        assert!(pending_phases("").is_empty());
        assert_eq!(plan_status(""), PlanStatus::default());
    }

    #[test]
    fn test_all_complete_document() {
        let doc = "#### Phase 1-1 A ✅\n#### Phase 1-2 B ✅\n";
        let status = plan_status(doc);
        assert!(status.is_complete());
        assert_eq!(status.total, 2);
        assert_eq!(status.completed, 2);
    }

    #[test]
    fn test_marker_requires_major_minor_id() {
        let doc = "#### Phase 1 Setup\n#### Phase one-two\n#### Phase 10-20 Real\n";
        assert_eq!(pending_phases(doc), vec!["Phase 10-20 Real"]);
    }

    #[test]
    fn test_marker_must_start_line() {
        let doc = "  #### Phase 1-1 Indented\n> #### Phase 1-2 Quoted\n";
        assert!(scan_markers(doc).is_empty());
    }

    #[test]
    fn test_extra_whitespace_and_crlf() {
        let doc = "####   Phase  4-1   Spaced   \r\n####\tPhase 4-2 Tabbed\r\n";
        assert_eq!(
            pending_phases(doc),
            vec!["Phase  4-1   Spaced", "Phase 4-2 Tabbed"]
        );
    }

    #[test]
    fn test_plan_status_counts() {
        let status = plan_status(SAMPLE_PLAN);
        assert_eq!(status.total, 3);
        assert_eq!(status.completed, 1);
        assert_eq!(status.pending.len(), 2);
        assert!(!status.is_complete());
    }
}
