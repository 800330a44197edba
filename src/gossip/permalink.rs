//! Permalink identities and their canonical URL form.
//!
//! `{remote}/tree/{commit}/{path}` plus an optional `#Lstart[-Lend]` range.
//! Encoding is `Display`, decoding is `FromStr`; the two are lossless
//! inverses for every valid permalink.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{GossipError, Result};

/// Inclusive 1-based line range; `start == end` is a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn single(line: u32) -> Self {
        Self { start: line, end: line }
    }
}

/// A URL that deterministically names a file at a specific commit, optionally
/// a line range within it. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permalink {
    pub remote: String,
    pub path: String,
    pub commit: String,
    pub range: Option<LineRange>,
}

impl Permalink {
    /// Build a permalink for an outgoing link. Only GitHub-style hosting
    /// remotes are recognized.
    pub fn new(
        remote: impl Into<String>,
        path: impl Into<String>,
        commit: impl Into<String>,
        range: Option<LineRange>,
    ) -> Result<Self> {
        let remote = remote.into();
        if !remote.contains("github.com") {
            return Err(GossipError::InvalidPermalink(format!(
                "not a GitHub remote: {remote}"
            )));
        }
        Ok(Self {
            remote,
            path: path.into(),
            commit: commit.into(),
            range,
        })
    }
}

impl fmt::Display for Permalink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/tree/{}/{}", self.remote, self.commit, self.path)?;
        if let Some(range) = self.range {
            write!(f, "#L{}", range.start)?;
            if range.end != range.start {
                write!(f, "-L{}", range.end)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Permalink {
    type Err = GossipError;

    fn from_str(url: &str) -> Result<Self> {
        let invalid = || GossipError::InvalidPermalink(url.to_string());

        let (remote, rest) = url.split_once("/tree/").ok_or_else(invalid)?;
        let (commit, rest) = rest.split_once('/').ok_or_else(invalid)?;
        if remote.is_empty() || commit.is_empty() || rest.is_empty() {
            return Err(invalid());
        }

        let (path, range) = match rest.split_once('#') {
            None => (rest, None),
            Some((path, fragment)) => (path, parse_fragment(fragment)),
        };

        Ok(Self {
            remote: remote.to_string(),
            path: path.to_string(),
            commit: commit.to_string(),
            range,
        })
    }
}

/// Parse a `L10` / `L10-L20` fragment. Anything malformed degrades to no
/// range rather than failing: a bad fragment still names a valid file.
fn parse_fragment(fragment: &str) -> Option<LineRange> {
    if !fragment.starts_with('L') {
        return None;
    }
    let digits = fragment.replace('L', "");
    match digits.split_once('-') {
        Some((start, end)) => {
            let start = start.parse().ok()?;
            let end = end.parse().ok()?;
            Some(LineRange::new(start, end))
        }
        None => digits.parse().ok().map(LineRange::single),
    }
}
