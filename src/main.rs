// gh-status entry point.
// Resolves configuration, collects the status, and prints it as JSON for the renderer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gh_status::cache::CacheStore;
use gh_status::config::{Config, DEFAULT_CONFIG_PATH};
use gh_status::github::{GitHubClient, ProcessRunner};
use gh_status::stats::StatusAssembler;

#[derive(Parser, Debug)]
#[command(name = "gh-status")]
#[command(about = "Collect GitHub activity and language statistics")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// GitHub username, overrides config file and environment
    #[arg(short, long)]
    username: Option<String>,

    /// Drop cached responses before fetching
    #[arg(long)]
    refresh: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = Config::resolve(&args.config, |key| std::env::var(key).ok());
    if let Some(username) = args.username {
        config.username = username;
    }
    config.prompt_username_if_missing()?;
    config.validate()?;

    let cache = CacheStore::new(&config.cache_dir);
    if args.refresh {
        cache
            .clear()
            .with_context(|| format!("clearing cache at {}", cache.dir().display()))?;
        info!("Cleared cache at {}", cache.dir().display());
    }

    let client = GitHubClient::new(config.token.as_deref(), cache)?
        .with_base_url(config.api_base.clone())
        .with_gh(Arc::new(ProcessRunner::new(config.gh_program.clone())))
        .with_request_delay(config.request_delay);

    info!(
        "Collecting status for {} (cache: {} {})",
        config.username, config.cache_duration, config.cache_unit
    );
    let report = match StatusAssembler::new(&client, config.username.clone(), config.cache_policy())
        .run()
        .await
    {
        Ok(report) => report,
        Err(e) => {
            if e.is_rate_limited() {
                warn!("GitHub rate limit exhausted; set GH_TOKEN or lengthen the cache duration");
            }
            return Err(anyhow::Error::new(e)
                .context(format!("collecting GitHub status for {}", config.username)));
        }
    };

    let failed: Vec<_> = report.failures().map(|(repo, _)| repo).collect();
    if !failed.is_empty() {
        warn!(
            "Language data missing for {} repositories: {}",
            failed.len(),
            failed.join(", ")
        );
    }

    println!("{}", serde_json::to_string_pretty(&report.status)?);
    Ok(())
}
