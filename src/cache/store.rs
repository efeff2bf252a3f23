// Cache store for reading and writing cached API responses.
// Handles JSON serialization, expiry checking, and filesystem operations.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

use super::paths::entry_file_name;
use super::policy::CachePolicy;

/// A cached response with the time it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The cached payload.
    pub data: T,
}

impl<T> CachedData<T> {
    /// Create a new entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            data,
        }
    }

    /// Check whether the entry is still fresh at `now_ms` under `policy`.
    pub fn is_fresh(&self, policy: &CachePolicy, now_ms: i64) -> bool {
        let window = policy.window_ms();
        window > 0 && now_ms.saturating_sub(self.timestamp) < window
    }
}

/// One JSON file per request path under a single directory.
///
/// Every failure is logged and degrades to a miss (on read) or a no-op (on
/// write); callers never see cache errors.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for a request path.
    pub fn entry_path(&self, path: &str) -> PathBuf {
        self.dir.join(entry_file_name(path))
    }

    /// Read the payload cached for `path` if it is fresh under `policy`.
    pub fn read(&self, path: &str, policy: &CachePolicy) -> Option<Value> {
        self.read_at(path, policy, Utc::now().timestamp_millis())
    }

    /// Same as [`read`](Self::read) with an explicit current time.
    pub fn read_at(&self, path: &str, policy: &CachePolicy, now_ms: i64) -> Option<Value> {
        if !policy.is_enabled() {
            debug!("Cache disabled for {}", path);
            return None;
        }

        let file = self.entry_path(path);
        let cached = match read_entry(&file) {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                debug!("Cache miss for {}", path);
                return None;
            }
            Err(e) => {
                warn!("Error reading cache for {}: {}", path, e);
                return None;
            }
        };

        if cached.is_fresh(policy, now_ms) {
            debug!("Cache hit for {}", path);
            Some(cached.data)
        } else {
            debug!("Cache expired for {}", path);
            None
        }
    }

    /// Store `data` for `path`, stamped with the current time.
    pub fn write(&self, path: &str, data: &Value) {
        self.write_entry(path, &CachedData::new(data));
    }

    /// Store a prepared entry for `path`.
    pub fn write_entry<T: Serialize>(&self, path: &str, entry: &CachedData<T>) {
        match write_atomic(&self.entry_path(path), entry) {
            Ok(()) => debug!("Cache written for {}", path),
            Err(e) => warn!("Error writing cache for {}: {}", path, e),
        }
    }

    /// Delete every cached entry.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

fn read_entry(file: &Path) -> Result<Option<CachedData<Value>>> {
    if !file.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(file)?;
    let cached: CachedData<Value> = serde_json::from_str(&contents)?;
    Ok(Some(cached))
}

fn write_atomic<T: Serialize>(file: &Path, entry: &CachedData<T>) -> Result<()> {
    // Ensure cache directory exists
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;

    // Write atomically via temp file
    let temp_path = file.with_extension("tmp");
    let mut out = fs::File::create(&temp_path)?;
    out.write_all(json.as_bytes())?;
    out.sync_all()?;
    fs::rename(&temp_path, file)?;

    Ok(())
}
