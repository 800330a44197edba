//! Data transfer objects.
//!
//! - `blame`: AttributionRecord for per-line author attribution
//! - `comment`: StoredComment read back from the gossip store

pub mod blame;
pub mod comment;

pub use blame::*;
pub use comment::*;
