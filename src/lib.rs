//! Headless data layer for inline git blame and commit-anchored comments.
//!
//! Three independent pieces, wired together by an editor integration or the
//! bundled `gossip` CLI:
//!
//! - [`git::blame`] parses `git blame -e` reports into [`AttributionRecord`]s
//!   and [`git::BlameCache`] keeps them keyed by exact buffer content, so an
//!   unchanged buffer never pays for a subprocess.
//! - [`gossip::Permalink`] is a reversible codec for GitHub-style permalink
//!   URLs (remote + commit + path + optional line range).
//! - [`gossip::CommentStore`] persists comment bodies under base64 permalink
//!   keys in `.git/gossip/`, surfacing only comments whose anchor commit is
//!   still reachable in the file's history.
//!
//! All git queries go through the [`git::RepositoryGateway`] trait;
//! [`git::GitRepository`] is the libgit2-backed implementation. Rendering
//! (signs, highlights, virtual text) is deliberately out of scope.

pub mod error;
pub mod git;
pub mod gossip;
pub mod models;

pub use error::{GossipError, Result};
pub use git::{BlameCache, BufferId, GitRepository, RepositoryGateway};
pub use gossip::{CommentStore, LineRange, Permalink};
pub use models::{AttributionRecord, StoredComment};
