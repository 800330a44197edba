//! Parser for `git blame -e` report lines.
//!
//! The format has no delimiter escaping, so the splitting order matters:
//! commit id up to the first `(`, email up to the first `>`, then a
//! fixed-width timestamp anchors the split between header and line content.
//! Emails and commit messages containing `(`, `)` or `>` never reach the
//! structural splits because each split only consumes the first occurrence
//! and everything after the timestamp anchor is positional.

use chrono::DateTime;

use crate::error::{GossipError, Result};
use crate::models::AttributionRecord;

/// `YYYY-MM-DD HH:MM:SS +HHMM`, as emitted by `git blame -e`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
/// Rendered width of `TIMESTAMP_FORMAT`.
const TIMESTAMP_LEN: usize = 25;

fn malformed(line: &str) -> GossipError {
    GossipError::MalformedBlameLine(line.to_string())
}

/// Parse one attribution line into a record. No side effects.
pub fn parse_line(line: &str) -> Result<AttributionRecord> {
    let (commit, rest) = line.split_once('(').ok_or_else(|| malformed(line))?;
    let commit_id = commit.trim().to_string();

    let (email, rest) = rest.split_once('>').ok_or_else(|| malformed(line))?;
    // Drop the `<` marker in front of the email.
    let author_email = email.get(1..).unwrap_or("").trim().to_string();

    let stamp = rest
        .trim_start()
        .get(..TIMESTAMP_LEN)
        .ok_or_else(|| malformed(line))?;
    let timestamp =
        DateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|_| malformed(line))?;

    // Split after the timestamp by re-rendering the parsed value and locating
    // it by content. The anchor is re-derived, not searched for literally, so
    // repeated substrings earlier in the line cannot shift the split.
    let rendered = timestamp.format(TIMESTAMP_FORMAT).to_string();
    let (_, rest) = rest.split_once(&rendered).ok_or_else(|| malformed(line))?;

    let rest = rest.trim_start();
    let (lineno, text) = rest.split_once(')').ok_or_else(|| malformed(line))?;
    let line_number: u32 = lineno.trim().parse().map_err(|_| malformed(line))?;
    // One separator byte follows the `)`; the rest is content, verbatim.
    let line_text = text.get(1..).unwrap_or("").to_string();

    Ok(AttributionRecord {
        commit_id,
        author_email,
        timestamp,
        line_number,
        line_text,
    })
}

/// Parse a whole report. Empty lines are dropped; the first malformed line
/// aborts the batch with no partial results.
pub fn parse_report(report: &str) -> Result<Vec<AttributionRecord>> {
    report
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn parses_simple_line() {
        let record =
            parse_line("abc123 (<jane@x.com> 2024-01-02 10:00:00 +0000 5) foo()").unwrap();
        assert_eq!(record.commit_id, "abc123");
        assert_eq!(record.author_email, "jane@x.com");
        assert_eq!(
            record.timestamp,
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 2, 10, 0, 0)
                .unwrap()
        );
        assert_eq!(record.line_number, 5);
        assert_eq!(record.line_text, "foo()");
    }

    #[test]
    fn line_text_keeps_internal_parentheses() {
        let record =
            parse_line("deadbeef (<a@b.c> 2023-06-30 23:59:59 +0200 12) call(foo(), bar))")
                .unwrap();
        assert_eq!(record.line_number, 12);
        assert_eq!(record.line_text, "call(foo(), bar))");
    }

    #[test]
    fn email_with_parentheses_does_not_shift_splits() {
        let record =
            parse_line("0011aa (<weird(name)@x.io> 2022-12-01 00:00:00 -0500  3) let x = 1;")
                .unwrap();
        assert_eq!(record.author_email, "weird(name)@x.io");
        assert_eq!(record.line_number, 3);
        assert_eq!(record.line_text, "let x = 1;");
    }

    #[test]
    fn content_with_angle_bracket_survives() {
        let record =
            parse_line("fe12 (<a@b.c> 2024-05-05 08:00:00 +0000 7) if a > b { return; }")
                .unwrap();
        assert_eq!(record.line_text, "if a > b { return; }");
    }

    #[test]
    fn content_repeating_the_timestamp_text_is_safe() {
        // The anchor is the first occurrence of the re-rendered timestamp,
        // which is the real header one.
        let record = parse_line(
            "aa (<a@b.c> 2024-01-01 00:00:00 +0000 1) logged at 2024-01-01 00:00:00 +0000",
        )
        .unwrap();
        assert_eq!(record.line_number, 1);
        assert_eq!(
            record.line_text,
            "logged at 2024-01-01 00:00:00 +0000"
        );
    }

    #[test]
    fn empty_content_line() {
        let record = parse_line("abcd (<a@b.c> 2024-01-01 00:00:00 +0000 2) ").unwrap();
        assert_eq!(record.line_text, "");
    }

    #[test]
    fn rejects_line_without_separators() {
        assert!(matches!(
            parse_line("not a blame line"),
            Err(GossipError::MalformedBlameLine(_))
        ));
        assert!(matches!(
            parse_line("abc (no email marker 2024-01-01 00:00:00 +0000 1) x"),
            Err(GossipError::MalformedBlameLine(_))
        ));
    }

    #[test]
    fn rejects_bad_timestamp() {
        assert!(matches!(
            parse_line("abc (<a@b.c> yesterday sometime around noon 1) x"),
            Err(GossipError::MalformedBlameLine(_))
        ));
    }

    #[test]
    fn report_parses_contiguous_lines() {
        let report = "\
a1 (<a@b.c> 2024-01-01 00:00:00 +0000 1) fn main() {
a1 (<a@b.c> 2024-01-01 00:00:00 +0000 2)     println!();
b2 (<d@e.f> 2024-02-01 00:00:00 +0000 3) }

";
        let records = parse_report(report).unwrap();
        let numbers: Vec<u32> = records.iter().map(|r| r.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(records[2].commit_id, "b2");
    }

    #[test]
    fn report_aborts_on_first_malformed_line() {
        let report = "\
a1 (<a@b.c> 2024-01-01 00:00:00 +0000 1) ok
garbage
a1 (<a@b.c> 2024-01-01 00:00:00 +0000 3) never reached";
        assert!(matches!(
            parse_report(report),
            Err(GossipError::MalformedBlameLine(line)) if line == "garbage"
        ));
    }
}
