//! Content-keyed blame cache.
//!
//! Keyed by the exact current text of a buffer, scoped per buffer id, so
//! unsaved edits invalidate blame while an unchanged buffer costs nothing.
//! A hit returns the cached records with no subprocess spawn; a miss writes
//! the text to a private temp file and hands it to the gateway's
//! `blame --content` invocation. Entries are never evicted: one entry per
//! distinct edit state of a single file during a session, surrounding tooling
//! may impose a cap.
//!
//! The `&mut self` API is what serializes recomputation: two callers cannot
//! race the same not-yet-cached text into two external invocations, because
//! only one of them can hold the cache at a time.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::{GossipError, Result};
use crate::git::blame;
use crate::git::repository::RepositoryGateway;
use crate::models::AttributionRecord;

pub type BufferId = u64;

#[derive(Default)]
pub struct BlameCache {
    /// buffer id -> buffer text -> attribution records
    entries: HashMap<BufferId, HashMap<String, Arc<Vec<AttributionRecord>>>>,
}

impl BlameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribution records for `text`, the current content of buffer
    /// `buffer` visiting `file`. Failures are not cached, so the next call
    /// with the same text retries the external invocation.
    pub fn get<G: RepositoryGateway>(
        &mut self,
        gateway: &G,
        buffer: BufferId,
        file: &Path,
        text: &str,
    ) -> Result<Arc<Vec<AttributionRecord>>> {
        if let Some(records) = self.entries.get(&buffer).and_then(|memo| memo.get(text)) {
            tracing::debug!(buffer, "blame cache hit");
            return Ok(Arc::clone(records));
        }

        let directory = file.parent().unwrap_or_else(|| Path::new("."));
        let filename = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                GossipError::BlameUnavailable(format!("not a file path: {}", file.display()))
            })?;

        // Unique per invocation; removed on drop whether blame succeeds or not.
        let mut content = NamedTempFile::new()?;
        content.write_all(text.as_bytes())?;
        content.flush()?;

        tracing::debug!(buffer, file = %file.display(), "blame cache miss, recomputing");
        let report = gateway.blame_against_working_copy(directory, filename, content.path())?;
        let records = Arc::new(blame::parse_report(&report)?);

        self.entries
            .entry(buffer)
            .or_default()
            .insert(text.to_string(), Arc::clone(&records));
        Ok(records)
    }

    /// Number of cached edit states for a buffer.
    pub fn entry_count(&self, buffer: BufferId) -> usize {
        self.entries.get(&buffer).map_or(0, |memo| memo.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Gateway that serves canned reports and counts blame invocations.
    struct FakeGateway {
        reports: RefCell<Vec<Result<String>>>,
        invocations: RefCell<usize>,
    }

    impl FakeGateway {
        fn new(reports: Vec<Result<String>>) -> Self {
            Self {
                reports: RefCell::new(reports),
                invocations: RefCell::new(0),
            }
        }

        fn invocations(&self) -> usize {
            *self.invocations.borrow()
        }
    }

    impl RepositoryGateway for FakeGateway {
        fn remote_url(&self, _name: &str) -> Result<String> {
            unreachable!()
        }
        fn head_commit(&self) -> Result<String> {
            unreachable!()
        }
        fn file_last_commit(&self, _path: &str) -> Result<String> {
            unreachable!()
        }
        fn file_commit_history(&self, _path: &str) -> Result<Vec<String>> {
            unreachable!()
        }
        fn repository_root(&self) -> Result<PathBuf> {
            unreachable!()
        }
        fn is_dirty(&self, _path: &str) -> Result<bool> {
            unreachable!()
        }
        fn blame_against_working_copy(
            &self,
            _directory: &Path,
            _filename: &str,
            content_path: &Path,
        ) -> Result<String> {
            // The handoff file must exist and hold the buffer text.
            assert!(content_path.exists());
            *self.invocations.borrow_mut() += 1;
            self.reports.borrow_mut().remove(0)
        }
    }

    fn report(commit: &str, text: &str) -> String {
        format!("{commit} (<a@b.c> 2024-01-01 00:00:00 +0000 1) {text}\n")
    }

    #[test]
    fn identical_text_invokes_blame_once() {
        let gateway = FakeGateway::new(vec![Ok(report("aaa", "hello"))]);
        let mut cache = BlameCache::new();
        let file = Path::new("/repo/src/lib.rs");

        let first = cache.get(&gateway, 1, file, "hello\n").unwrap();
        let second = cache.get(&gateway, 1, file, "hello\n").unwrap();

        assert_eq!(gateway.invocations(), 1);
        assert_eq!(first, second);
        assert_eq!(first[0].line_text, "hello");
    }

    #[test]
    fn distinct_text_recomputes_and_old_entry_survives() {
        let gateway = FakeGateway::new(vec![
            Ok(report("aaa", "v1")),
            Ok(report("bbb", "v2")),
        ]);
        let mut cache = BlameCache::new();
        let file = Path::new("/repo/src/lib.rs");

        cache.get(&gateway, 1, file, "v1\n").unwrap();
        cache.get(&gateway, 1, file, "v2\n").unwrap();
        assert_eq!(gateway.invocations(), 2);
        assert_eq!(cache.entry_count(1), 2);

        // Back to the first text: a hit, no third invocation.
        let again = cache.get(&gateway, 1, file, "v1\n").unwrap();
        assert_eq!(gateway.invocations(), 2);
        assert_eq!(again[0].commit_id, "aaa");
    }

    #[test]
    fn buffers_are_scoped_independently() {
        let gateway = FakeGateway::new(vec![
            Ok(report("aaa", "same")),
            Ok(report("bbb", "same")),
        ]);
        let mut cache = BlameCache::new();
        let file = Path::new("/repo/src/lib.rs");

        cache.get(&gateway, 1, file, "same\n").unwrap();
        cache.get(&gateway, 2, file, "same\n").unwrap();
        assert_eq!(gateway.invocations(), 2);
    }

    #[test]
    fn failed_invocation_is_not_cached() {
        let gateway = FakeGateway::new(vec![
            Err(GossipError::BlameUnavailable("fatal: no such path".into())),
            Ok(report("aaa", "ok")),
        ]);
        let mut cache = BlameCache::new();
        let file = Path::new("/repo/src/lib.rs");

        assert!(matches!(
            cache.get(&gateway, 1, file, "x\n"),
            Err(GossipError::BlameUnavailable(_))
        ));
        assert_eq!(cache.entry_count(1), 0);

        // Retry with the same key issues a fresh invocation and succeeds.
        let records = cache.get(&gateway, 1, file, "x\n").unwrap();
        assert_eq!(gateway.invocations(), 2);
        assert_eq!(records[0].commit_id, "aaa");
    }

    #[test]
    fn malformed_report_is_not_cached() {
        let gateway = FakeGateway::new(vec![Ok("garbage".into())]);
        let mut cache = BlameCache::new();
        let file = Path::new("/repo/src/lib.rs");

        assert!(matches!(
            cache.get(&gateway, 1, file, "x\n"),
            Err(GossipError::MalformedBlameLine(_))
        ));
        assert_eq!(cache.entry_count(1), 0);
    }
}
