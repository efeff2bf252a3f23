// GitHub API module.
// Provides the cached client, the gh CLI transport, and response types.

pub mod client;
pub mod endpoints;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_REQUEST_DELAY, GITHUB_API_BASE, GitHubClient};
pub use transport::{CommandRunner, ProcessRunner, TransportAvailability, TransportSelector};
pub use types::*;
