//! Blame attribution records.
//!
//! One `AttributionRecord` per source line, produced by parsing a
//! `git blame -e` report. Records are created fresh on every parse and never
//! mutated; a new parse supersedes the previous sequence wholesale.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Per-line attribution for one line of a file version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRecord {
    /// OID of the commit that introduced the line, as emitted by the tool
    /// (full or abbreviated)
    pub commit_id: String,
    /// Author email, without angle brackets
    pub author_email: String,
    /// Commit authoring time, timezone-aware
    pub timestamp: DateTime<FixedOffset>,
    /// Line number (1-indexed) in the current file version
    pub line_number: u32,
    /// Literal source line content as reported
    pub line_text: String,
}
