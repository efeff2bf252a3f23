// gh CLI transport.
// Probes once whether an authenticated gh is usable and runs `gh api` requests through it.

use std::process::{Output, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{Result, StatusError};

/// Runs the gh program with the given arguments.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> std::io::Result<Output>;
}

/// Spawns a real program and waits for it to exit.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("gh")
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
    }
}

/// Whether the gh transport can be used for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAvailability {
    Unknown,
    Available,
    Unavailable,
}

/// Decides once per client whether requests may go through gh.
///
/// The probe result is memoized; a failed probe is not retried.
pub struct TransportSelector {
    runner: Arc<dyn CommandRunner>,
    has_credential: bool,
    available: OnceCell<bool>,
}

impl TransportSelector {
    pub fn new(runner: Arc<dyn CommandRunner>, has_credential: bool) -> Self {
        Self {
            runner,
            has_credential,
            available: OnceCell::new(),
        }
    }

    /// A selector that never uses gh.
    pub fn disabled() -> Self {
        Self::new(Arc::new(ProcessRunner::default()), false)
    }

    /// Current state without triggering a probe.
    pub fn availability(&self) -> TransportAvailability {
        match self.available.get() {
            None => TransportAvailability::Unknown,
            Some(true) => TransportAvailability::Available,
            Some(false) => TransportAvailability::Unavailable,
        }
    }

    /// Resolve availability, probing on first call only.
    pub async fn probe(&self) -> bool {
        *self
            .available
            .get_or_init(|| async { self.check_auth().await })
            .await
    }

    async fn check_auth(&self) -> bool {
        if !self.has_credential {
            debug!("No GitHub token set, skipping gh auth probe");
            return false;
        }

        match self.runner.run(&["auth", "status"]).await {
            Ok(output) if output.status.success() => {
                info!("gh CLI is authenticated, using it as primary transport");
                true
            }
            Ok(output) => {
                warn!(
                    "gh auth status exited with {}, using HTTP transport",
                    output.status
                );
                false
            }
            Err(e) => {
                warn!("Could not run gh auth status: {}, using HTTP transport", e);
                false
            }
        }
    }

    /// Run `gh api --method GET <path>` and parse its output as JSON.
    pub async fn fetch(&self, path: &str) -> Result<Value> {
        let output = self
            .runner
            .run(&["api", "--method", "GET", path])
            .await
            .map_err(|e| StatusError::Cli(format!("failed to run gh api: {}", e)))?;

        if !output.status.success() {
            return Err(StatusError::Cli(format!(
                "gh api exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(StatusError::Cli("gh api returned no output".to_string()));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| StatusError::Cli(format!("gh api returned invalid JSON: {}", e)))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRunner;
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_skips_probe() {
        let runner = Arc::new(FakeRunner::new(0, 0, "{}"));
        let selector = TransportSelector::new(runner.clone(), false);

        assert_eq!(selector.availability(), TransportAvailability::Unknown);
        assert!(!selector.probe().await);
        assert_eq!(selector.availability(), TransportAvailability::Unavailable);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_probe_runs_once() {
        let runner = Arc::new(FakeRunner::new(0, 0, "{}"));
        let selector = TransportSelector::new(runner.clone(), true);

        let (a, b) = tokio::join!(selector.probe(), selector.probe());
        assert!(a && b);
        assert!(selector.probe().await);
        assert_eq!(selector.availability(), TransportAvailability::Available);
        assert_eq!(runner.calls(), vec![vec!["auth".to_string(), "status".to_string()]]);
    }

    #[tokio::test]
    async fn test_failed_probe_is_memoized() {
        let runner = Arc::new(FakeRunner::new(1, 0, "{}"));
        let selector = TransportSelector::new(runner.clone(), true);

        assert!(!selector.probe().await);
        assert!(!selector.probe().await);
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_error_is_unavailable() {
        let runner = Arc::new(ProcessRunner::new("gh-status-test-no-such-program"));
        let selector = TransportSelector::new(runner, true);

        assert!(!selector.probe().await);
        assert_eq!(selector.availability(), TransportAvailability::Unavailable);
    }

    #[tokio::test]
    async fn test_fetch_parses_output() {
        let runner = Arc::new(FakeRunner::new(0, 0, "{\"Rust\": 42}"));
        let selector = TransportSelector::new(runner.clone(), true);

        let value = selector.fetch("/repos/o/r/languages").await.unwrap();
        assert_eq!(value["Rust"], 42);
        assert_eq!(
            runner.calls()[0],
            vec!["api", "--method", "GET", "/repos/o/r/languages"]
        );
    }

    #[tokio::test]
    async fn test_fetch_failures() {
        let failing = TransportSelector::new(Arc::new(FakeRunner::new(0, 1, "{}")), true);
        assert!(matches!(failing.fetch("/x").await, Err(StatusError::Cli(_))));

        let empty = TransportSelector::new(Arc::new(FakeRunner::new(0, 0, " \n")), true);
        assert!(matches!(empty.fetch("/x").await, Err(StatusError::Cli(_))));

        let garbage = TransportSelector::new(Arc::new(FakeRunner::new(0, 0, "<html>")), true);
        assert!(matches!(garbage.fetch("/x").await, Err(StatusError::Cli(_))));
    }
}
