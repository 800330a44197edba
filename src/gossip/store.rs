//! On-disk comment store.
//!
//! Comments live at `<repo>/.git/gossip/<key>` with the body stored verbatim,
//! one file per distinct encoded permalink and no index file; discovery is by
//! directory enumeration. Writes are last-write-wins per key. The store never
//! performs the dirty-file check itself; callers reject dirty files before
//! any storage mutation (see [`crate::gossip::add_comment`]).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gossip::key;
use crate::gossip::Permalink;
use crate::models::StoredComment;

pub struct CommentStore {
    root: PathBuf,
}

impl CommentStore {
    /// Store rooted inside the repository's `.git` directory. Nothing is
    /// created until the first write.
    pub fn at(repo_root: &Path) -> Self {
        Self {
            root: repo_root.join(".git").join("gossip"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `body` under the key derived from `permalink`, overwriting any
    /// previous body for the same key.
    pub fn write(&self, permalink: &Permalink, body: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(key::to_key(permalink));
        fs::write(&path, body)?;
        Ok(path)
    }

    /// All comments whose decoded path equals `path` and whose decoded commit
    /// is in `valid_commits`. Entries that do not carry the reserved suffix
    /// or fail to decode are skipped, not fatal: the directory may hold
    /// unrelated or legacy files.
    pub fn list_for_file(
        &self,
        path: &str,
        valid_commits: &HashSet<String>,
    ) -> Result<Vec<StoredComment>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut comments = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(key::COMMENT_SUFFIX) {
                continue;
            }
            let permalink = match key::from_key(name) {
                Ok(permalink) => permalink,
                Err(err) => {
                    tracing::debug!(name, %err, "skipping undecodable store entry");
                    continue;
                }
            };
            if permalink.path != path || !valid_commits.contains(&permalink.commit) {
                continue;
            }
            let body = fs::read_to_string(entry.path())?;
            comments.push(StoredComment { permalink, body });
        }

        // Directory order is arbitrary; present comments top of file first.
        comments.sort_by_key(|c| (c.permalink.range.map(|r| r.start), c.permalink.commit.clone()));
        Ok(comments)
    }
}
