pub mod blame;
pub mod cache;
pub mod repository;

pub use cache::{BlameCache, BufferId};
pub use repository::{format_relative_time, GitRepository, RepositoryGateway};
