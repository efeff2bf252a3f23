// Cache module for local filesystem caching.
// Stores GitHub API responses so repeated runs stay inside the rate limit.

pub mod paths;
pub mod policy;
pub mod store;

pub use paths::{cache_key, default_cache_dir};
pub use policy::{CachePolicy, CacheUnit};
pub use store::{CacheStore, CachedData};
