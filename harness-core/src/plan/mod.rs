//! Plan scanning
//!
//! This module extracts phase markers from a plan document so the
//! execution loop can tell which phases are still pending.

mod scanner;

pub use scanner::{pending_phases, plan_status, scan_markers, PhaseMarker, PlanStatus, COMPLETION_GLYPH};
