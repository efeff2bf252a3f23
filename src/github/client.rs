// GitHub API client.
// Serves requests from the response cache, the gh CLI, or plain HTTP, in that order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CachePolicy, CacheStore};
use crate::error::{Result, StatusError};

use super::transport::{CommandRunner, TransportSelector};
use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = concat!("gh-status/", env!("CARGO_PKG_VERSION"));

/// Pause before every request that misses the cache.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// GitHub API client with response caching, transport fallback and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    authenticated: bool,
    cache: CacheStore,
    transport: TransportSelector,
    request_delay: Duration,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client; `token` is sent as a bearer credential when present.
    pub fn new(token: Option<&str>, cache: CacheStore) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| StatusError::Config(format!("invalid token: {}", e)))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: GITHUB_API_BASE.to_string(),
            authenticated: token.is_some(),
            cache,
            transport: TransportSelector::disabled(),
            request_delay: DEFAULT_REQUEST_DELAY,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Point the HTTP transport at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Allow the gh CLI transport, spawned through `runner`.
    pub fn with_gh(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.transport = TransportSelector::new(runner, self.authenticated);
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn transport(&self) -> &TransportSelector {
        &self.transport
    }

    /// Rate limit reported by the most recent HTTP response.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Fetch `path` and decode it as `T`.
    ///
    /// Order: fresh cache entry, then gh (when authenticated and usable),
    /// then HTTP. gh failures fall through to HTTP; an HTTP failure is
    /// returned to the caller. Successful upstream responses are cached.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, policy: &CachePolicy) -> Result<T> {
        if let Some(cached) = self.cache.read(path, policy) {
            match serde_json::from_value(cached) {
                Ok(data) => return Ok(data),
                Err(e) => warn!("Ignoring cached {} with unexpected shape: {}", path, e),
            }
        }

        tokio::time::sleep(self.request_delay).await;

        if self.transport.probe().await {
            match self.fetch_via_gh::<T>(path).await {
                Ok(data) => return Ok(data),
                Err(e) => warn!("gh api failed for {}, falling back to HTTP: {}", path, e),
            }
        }

        self.fetch_via_http(path).await
    }

    async fn fetch_via_gh<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.transport.fetch(path).await?;
        let data = T::deserialize(&value)
            .map_err(|e| StatusError::Cli(format!("unexpected response shape: {}", e)))?;
        info!("Fetched via gh cli: {}{}", self.base_url, path);
        self.cache.write(path, &value);
        Ok(data)
    }

    async fn fetch_via_http<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        if !self.authenticated {
            warn!("No GitHub token set, using unauthenticated request for {}", path);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.update_rate_limit(&response);
        let remaining = rate_limit_remaining(response.headers());
        let response = self.check_response(response).await?;

        let value: Value = response.json().await?;
        let data = T::deserialize(&value)?;
        match remaining {
            Some(remaining) => info!(
                "Fetched via HTTP: {} (rate limit remaining: {})",
                url, remaining
            ),
            None => info!("Fetched via HTTP: {}", url),
        }
        self.cache.write(path, &value);
        Ok(data)
    }

    /// Convert an absolute API URL (such as `languages_url`) into a path for [`fetch`](Self::fetch).
    pub fn relative_path<'a>(&self, url: &'a str) -> &'a str {
        for base in [self.base_url.as_str(), GITHUB_API_BASE] {
            if url.len() >= base.len()
                && url.is_char_boundary(base.len())
                && url[..base.len()].eq_ignore_ascii_case(base)
            {
                return &url[base.len()..];
            }
        }
        url
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let rate_limit_remaining = rate_limit_remaining(response.headers());
        let body = response.text().await.unwrap_or_default();

        Err(StatusError::Status {
            url,
            status: status.as_u16(),
            rate_limit_remaining,
            body,
        })
    }
}

/// Remaining request quota reported by a single response.
fn rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
