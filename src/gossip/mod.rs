//! Permalinks and commit-anchored gossip comments.
//!
//! The free functions here tie the gateway to the codec and store: resolving
//! a file to its repository-relative path, building HEAD- or last-commit-
//! anchored permalinks, and the guarded comment write / history-filtered
//! comment listing.

pub mod key;
pub mod permalink;
pub mod store;

pub use permalink::{LineRange, Permalink};
pub use store::CommentStore;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{GossipError, Result};
use crate::git::RepositoryGateway;
use crate::models::StoredComment;

/// Resolve an on-disk file to its path relative to the repository root,
/// forward slashes regardless of host.
pub fn path_in_repo<G: RepositoryGateway>(gateway: &G, file: &Path) -> Result<String> {
    let root = gateway.repository_root()?.canonicalize()?;
    let file = file.canonicalize()?;
    let relative = file.strip_prefix(&root).map_err(|_| {
        GossipError::InvalidPermalink(format!("{} is outside the repository", file.display()))
    })?;
    Ok(relative.to_string_lossy().replace('\\', "/"))
}

/// Permalink for `file` at the commit HEAD points at.
pub fn permalink_at_head<G: RepositoryGateway>(
    gateway: &G,
    file: &Path,
    range: Option<LineRange>,
) -> Result<Permalink> {
    let remote = gateway.remote_url("origin")?;
    let path = path_in_repo(gateway, file)?;
    let commit = gateway.head_commit()?;
    Permalink::new(remote, path, commit, range)
}

/// Permalink for `file` at the last commit that touched it. This is the
/// identity comments are anchored to: it stays stable while unrelated
/// commits move HEAD forward.
pub fn comment_anchor<G: RepositoryGateway>(
    gateway: &G,
    file: &Path,
    range: Option<LineRange>,
) -> Result<Permalink> {
    let remote = gateway.remote_url("origin")?;
    let path = path_in_repo(gateway, file)?;
    let commit = gateway.file_last_commit(&path)?;
    Permalink::new(remote, path, commit, range)
}

/// Attach a comment to a line range of a clean file. A dirty file is rejected
/// before the store is touched: a comment written against uncommitted lines
/// would anchor to a commit that does not contain them.
pub fn add_comment<G: RepositoryGateway>(
    gateway: &G,
    store: &CommentStore,
    file: &Path,
    range: LineRange,
    body: &str,
) -> Result<(Permalink, PathBuf)> {
    let path = path_in_repo(gateway, file)?;
    if gateway.is_dirty(&path)? {
        return Err(GossipError::DirtyFileRejected(path));
    }
    let remote = gateway.remote_url("origin")?;
    let commit = gateway.file_last_commit(&path)?;
    let permalink = Permalink::new(remote, path, commit, Some(range))?;
    let stored = store.write(&permalink, body)?;
    Ok((permalink, stored))
}

/// Comments for `file` still anchored to a commit in its history. Comments
/// whose commit was rebased or force-pushed away are silently dropped.
pub fn list_comments<G: RepositoryGateway>(
    gateway: &G,
    store: &CommentStore,
    file: &Path,
) -> Result<Vec<StoredComment>> {
    let path = path_in_repo(gateway, file)?;
    let valid: HashSet<String> = gateway.file_commit_history(&path)?.into_iter().collect();
    store.list_for_file(&path, &valid)
}
