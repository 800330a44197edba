//! Stored gossip comments.

use serde::Serialize;

use crate::gossip::Permalink;

/// A comment read back from the store, paired with the permalink identity
/// decoded from its storage key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredComment {
    pub permalink: Permalink,
    pub body: String,
}
