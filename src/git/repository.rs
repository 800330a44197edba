//! Repository gateway: the version-control queries the core depends on.
//!
//! `RepositoryGateway` is the seam between the headless core and git itself;
//! `GitRepository` is the libgit2-backed implementation. The one exception is
//! `blame_against_working_copy`, which shells out to the git binary because
//! the blame parser consumes the textual `-e` report format and the
//! `--content` flag lets blame run against not-yet-saved buffer text.

use git2::{DiffOptions, Repository, Sort};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{GossipError, Result};

pub trait RepositoryGateway {
    /// URL of the named remote (usually `origin`).
    fn remote_url(&self, name: &str) -> Result<String>;

    /// OID of the commit HEAD points at.
    fn head_commit(&self) -> Result<String>;

    /// OID of the most recent commit touching `path` (relative to the
    /// repository root). Falls back to HEAD when no touching commit is found.
    fn file_last_commit(&self, path: &str) -> Result<String>;

    /// Every commit touching `path`, newest first.
    fn file_commit_history(&self, path: &str) -> Result<Vec<String>>;

    /// Absolute path of the working directory.
    fn repository_root(&self) -> Result<PathBuf>;

    /// Whether `path` has uncommitted changes (index or worktree).
    fn is_dirty(&self, path: &str) -> Result<bool>;

    /// Raw `git blame -e` report for `filename` inside `directory`, run
    /// against the content stored at `content_path` instead of the file on
    /// disk.
    fn blame_against_working_copy(
        &self,
        directory: &Path,
        filename: &str,
        content_path: &Path,
    ) -> Result<String>;
}

pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }
}

impl RepositoryGateway for GitRepository {
    fn remote_url(&self, name: &str) -> Result<String> {
        let remote = self.repo.find_remote(name)?;
        remote
            .url()
            .map(|url| url.to_string())
            .ok_or_else(|| GossipError::InvalidPermalink(format!("remote {name} has no URL")))
    }

    fn head_commit(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head.peel_to_commit()?.id().to_string())
    }

    fn file_last_commit(&self, path: &str) -> Result<String> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            if commit_touches_path(&self.repo, &commit, path)? {
                return Ok(oid.to_string());
            }
        }

        // Fallback: the head commit
        self.head_commit()
    }

    fn file_commit_history(&self, path: &str) -> Result<Vec<String>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut history = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            if commit_touches_path(&self.repo, &commit, path)? {
                history.push(oid.to_string());
            }
        }
        Ok(history)
    }

    fn repository_root(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| {
                GossipError::Git(git2::Error::from_str("bare repository has no working directory"))
            })
    }

    fn is_dirty(&self, path: &str) -> Result<bool> {
        let status = self.repo.status_file(Path::new(path))?;
        Ok(!status.is_empty())
    }

    fn blame_against_working_copy(
        &self,
        directory: &Path,
        filename: &str,
        content_path: &Path,
    ) -> Result<String> {
        tracing::debug!(?directory, filename, "running git blame");
        let output = Command::new("git")
            .arg("-C")
            .arg(directory)
            .arg("blame")
            .arg(filename)
            .arg("--content")
            .arg(content_path)
            .arg("-e")
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() || (stdout.is_empty() && !output.stderr.is_empty()) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GossipError::BlameUnavailable(stderr.trim().to_string()));
        }
        Ok(stdout)
    }
}

/// Check if a commit modified the given path relative to its first parent.
fn commit_touches_path(repo: &Repository, commit: &git2::Commit, path: &str) -> Result<bool> {
    let tree = commit.tree()?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut opts = DiffOptions::new();
    opts.pathspec(path);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    Ok(diff.deltas().len() > 0)
}

/// Human-friendly age for blame display.
pub fn format_relative_time(timestamp: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}
