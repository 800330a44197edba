//! Error types shared across the crate.
//!
//! `GossipError` covers the whole taxonomy:
//! - `MalformedBlameLine` — an attribution line missing its structural
//!   separators; aborts the whole report parse, partial attribution is worse
//!   than none
//! - `BlameUnavailable` — the external blame invocation failed; nothing is
//!   cached, the next request retries
//! - `InvalidPermalink` / `InvalidCommentKey` — malformed identifier; fatal
//!   when decoding a single value, skipped when scanning the store directory
//! - `DirtyFileRejected` — comment write attempted against a file with
//!   uncommitted changes, rejected before any storage mutation
//! - `Git` / `Io` — gateway and filesystem failures, surfaced as-is

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GossipError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Malformed blame line: {0}")]
    MalformedBlameLine(String),

    #[error("Blame unavailable: {0}")]
    BlameUnavailable(String),

    #[error("Invalid permalink: {0}")]
    InvalidPermalink(String),

    #[error("Invalid comment key: {0}")]
    InvalidCommentKey(String),

    #[error("File has uncommitted changes: {0}")]
    DirtyFileRejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GossipError>;
