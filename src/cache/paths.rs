// Cache path utilities.
// Resolves the cache directory and maps request paths onto entry file names.

use std::path::PathBuf;

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

/// Fallback directory, relative to the working directory.
const FALLBACK_CACHE_DIR: &str = ".cache";

/// Get the default response cache directory (~/.cache/gh-status/api on Linux).
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "gh-status")
        .map(|dirs| dirs.cache_dir().join("api"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}

/// Derive the storage key for a request path.
///
/// The readable part replaces every character outside `[A-Za-z0-9]` with an
/// underscore. A short SHA-256 digest of the raw path keeps paths that
/// sanitize to the same text (`/a-b` and `/a_b`) in separate entries.
pub fn cache_key(path: &str) -> String {
    let readable = sanitize_name(path);
    let digest = Sha256::digest(path.as_bytes());
    format!("{}-{}", readable, &hex::encode(digest)[..16])
}

/// Entry file name for a request path.
pub fn entry_file_name(path: &str) -> String {
    format!("{}.json", cache_key(path))
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
