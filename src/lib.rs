// gh-status library.
// Collects a GitHub user's activity counters and language usage with a local response cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod stats;

pub use config::Config;
pub use error::{Result, StatusError};
pub use stats::{GitHubStatus, StatusAssembler, StatusReport};
