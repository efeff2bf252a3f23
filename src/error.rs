// Error types for gh-status.
// Covers HTTP transport failures, gh transport failures, cache I/O and configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("GitHub API error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(
        "Failed to fetch {url}: status {status}, rate limit remaining: {}, body: {body}",
        display_remaining(.rate_limit_remaining)
    )]
    Status {
        url: String,
        status: u16,
        rate_limit_remaining: Option<u64>,
        body: String,
    },

    #[error("gh transport failed: {0}")]
    Cli(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to fetch {what}: {source}")]
    CoreFetch {
        what: &'static str,
        #[source]
        source: Box<StatusError>,
    },
}

impl StatusError {
    /// Whether this is a 403/429 response with the quota exhausted.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            StatusError::Status {
                status: 403 | 429,
                rate_limit_remaining: Some(0),
                ..
            } => true,
            StatusError::CoreFetch { source, .. } => source.is_rate_limited(),
            _ => false,
        }
    }

    /// HTTP status carried by a non-success response, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StatusError::Status { status, .. } => Some(*status),
            StatusError::CoreFetch { source, .. } => source.status_code(),
            _ => None,
        }
    }
}

fn display_remaining(remaining: &Option<u64>) -> String {
    remaining
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub type Result<T> = std::result::Result<T, StatusError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, remaining: Option<u64>) -> StatusError {
        StatusError::Status {
            url: "https://api.github.com/users/octocat".to_string(),
            status: code,
            rate_limit_remaining: remaining,
            body: "{\"message\":\"API rate limit exceeded\"}".to_string(),
        }
    }

    #[test]
    fn test_rate_limited_detection() {
        assert!(status(403, Some(0)).is_rate_limited());
        assert!(status(429, Some(0)).is_rate_limited());
        assert!(!status(403, Some(12)).is_rate_limited());
        assert!(!status(404, Some(0)).is_rate_limited());
        assert!(!status(403, None).is_rate_limited());
    }

    #[test]
    fn test_status_message_includes_body_and_quota() {
        let message = status(403, Some(0)).to_string();
        assert!(message.contains("status 403"));
        assert!(message.contains("rate limit remaining: 0"));
        assert!(message.contains("API rate limit exceeded"));

        let unknown = status(500, None).to_string();
        assert!(unknown.contains("rate limit remaining: unknown"));
    }

    #[test]
    fn test_core_fetch_names_the_fetch() {
        let err = StatusError::CoreFetch {
            what: "user profile",
            source: Box::new(status(404, Some(59))),
        };
        assert!(err.to_string().starts_with("Failed to fetch user profile:"));
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_rate_limit_seen_through_core_fetch() {
        let err = StatusError::CoreFetch {
            what: "repository list",
            source: Box::new(status(403, Some(0))),
        };
        assert!(err.is_rate_limited());
    }
}
