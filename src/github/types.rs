// GitHub API response types.
// Defines structs for deserializing the profile, repository and language responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Public profile of a GitHub user (`GET /users/{login}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub login: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
}

/// Repository as listed by `GET /users/{login}/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub languages_url: String,
}

/// Language name to byte count, as returned by a repository's `languages_url`.
pub type LanguageBytes = BTreeMap<String, u64>;

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
