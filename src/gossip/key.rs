//! Storage keys for gossip comments.
//!
//! A comment's file name is the url-safe base64 of its encoded permalink
//! with a reserved `.gossip.md` suffix. Raw permalink URLs contain `/`, `:`
//! and `#`, none of which are usable in a file name; base64 makes the name
//! safe while staying invertible without a side index.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::{GossipError, Result};
use crate::gossip::Permalink;

/// Reserved extension marking gossip comment files.
pub const COMMENT_SUFFIX: &str = ".gossip.md";

/// Derive the storage file name for a permalink.
pub fn to_key(permalink: &Permalink) -> String {
    let mut key = URL_SAFE.encode(permalink.to_string());
    key.push_str(COMMENT_SUFFIX);
    key
}

/// Recover the permalink a storage file name was derived from.
pub fn from_key(key: &str) -> Result<Permalink> {
    let invalid = || GossipError::InvalidCommentKey(key.to_string());

    let encoded = key.strip_suffix(COMMENT_SUFFIX).ok_or_else(invalid)?;
    let bytes = URL_SAFE.decode(encoded).map_err(|_| invalid())?;
    let url = String::from_utf8(bytes).map_err(|_| invalid())?;
    url.parse()
}
