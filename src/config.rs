// Configuration resolution.
// Layers defaults, a TOML file, environment variables and flags into one Config.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::{CachePolicy, CacheUnit, default_cache_dir};
use crate::error::{Result, StatusError};
use crate::github::{DEFAULT_REQUEST_DELAY, GITHUB_API_BASE};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/gh.toml";

/// Environment variables holding the API credential, in priority order.
const TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub username: String,
    pub cache_duration: f64,
    pub cache_unit: CacheUnit,
    pub cache_dir: PathBuf,
    pub request_delay: Duration,
    pub gh_program: String,
    /// API root for the HTTP transport (GitHub Enterprise or a test server).
    pub api_base: String,
    /// Never serialized or logged.
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            cache_duration: 1.0,
            cache_unit: CacheUnit::Hours,
            cache_dir: default_cache_dir(),
            request_delay: DEFAULT_REQUEST_DELAY,
            gh_program: "gh".to_string(),
            api_base: GITHUB_API_BASE.to_string(),
            token: None,
        }
    }
}

/// Fields accepted in the config file; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
struct FileConfig {
    username: Option<String>,
    cache_duration: Option<f64>,
    cache_unit: Option<String>,
    cache_dir: Option<PathBuf>,
    request_delay_ms: Option<u64>,
    gh_program: Option<String>,
    api_base: Option<String>,
}

impl Config {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.cache_duration, self.cache_unit)
    }

    /// Resolve from defaults, `file`, and the environment seen through `env`.
    ///
    /// A missing file is skipped silently; an unreadable one is logged and skipped.
    pub fn resolve<F>(file: &Path, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(file_config) = load_file(file) {
            config.apply_file(file_config);
        }
        config.apply_env(&env);
        config.token = TOKEN_VARS
            .iter()
            .filter_map(|name| env(name))
            .find(|value| !value.trim().is_empty());
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(username) = file.username.filter(|u| !u.trim().is_empty()) {
            self.username = username.trim().to_string();
        }
        if let Some(duration) = file.cache_duration {
            self.set_duration(duration, "config file");
        }
        if let Some(unit) = file.cache_unit {
            self.set_unit(&unit, "config file");
        }
        if let Some(dir) = file.cache_dir {
            self.cache_dir = dir;
        }
        if let Some(ms) = file.request_delay_ms {
            self.request_delay = Duration::from_millis(ms);
        }
        if let Some(program) = file.gh_program.filter(|p| !p.trim().is_empty()) {
            self.gh_program = program;
        }
        if let Some(base) = file.api_base.filter(|b| !b.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
    }

    fn apply_env<F>(&mut self, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = env("GITHUB_REPOSITORY_OWNER").filter(|u| !u.trim().is_empty()) {
            info!("Using username from GITHUB_REPOSITORY_OWNER: {}", username);
            self.username = username.trim().to_string();
        }
        if let Some(raw) = env("GH_CACHE_DURATION") {
            match raw.trim().parse::<f64>() {
                Ok(duration) => self.set_duration(duration, "GH_CACHE_DURATION"),
                Err(_) => warn!("Ignoring non-numeric GH_CACHE_DURATION: {}", raw),
            }
        }
        if let Some(unit) = env("GH_CACHE_UNIT") {
            self.set_unit(unit.trim(), "GH_CACHE_UNIT");
        }
        if let Some(dir) = env("GH_STATUS_CACHE_DIR").filter(|d| !d.trim().is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(base) = env("GH_STATUS_API_BASE").filter(|b| !b.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
    }

    fn set_duration(&mut self, duration: f64, source: &str) {
        if duration.is_finite() && duration >= 0.0 {
            self.cache_duration = duration;
        } else {
            warn!("Ignoring invalid cache duration {} from {}", duration, source);
        }
    }

    fn set_unit(&mut self, unit: &str, source: &str) {
        match unit.parse() {
            Ok(unit) => self.cache_unit = unit,
            Err(e) => warn!("Ignoring {} from {}", e, source),
        }
    }

    /// Ask on stdin for the username if no layer provided one.
    ///
    /// The prompt is written to stderr; stdout carries only the status JSON.
    pub fn prompt_username_if_missing(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stderr = io::stderr();
        self.prompt_username_with(&mut stdin.lock(), &mut stderr.lock())
    }

    fn prompt_username_with(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<()> {
        if !self.username.is_empty() {
            return Ok(());
        }
        info!("Username not found in config file or environment");
        self.username = prompt(input, output, "Enter username")?;
        self.validate()
    }

    /// A username is required.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(StatusError::Config("username is required".to_string()));
        }
        if self
            .username
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(StatusError::Config(format!(
                "invalid GitHub username: {}",
                self.username
            )));
        }
        Ok(())
    }
}

fn load_file(path: &Path) -> Option<FileConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Config file not found at {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Error reading config file {}: {}", path.display(), e);
            return None;
        }
    };
    match toml::from_str(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Error parsing config file {}: {}", path.display(), e);
            None
        }
    }
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> Result<String> {
    write!(output, "{}: ", label)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
