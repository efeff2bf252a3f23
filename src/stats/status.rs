// Status assembly.
// Fetches the profile and repositories, folds language data, and builds the final status.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::CachePolicy;
use crate::error::{Result, StatusError};
use crate::github::{GitHubClient, LanguageBytes, Repository, UserProfile};

use super::languages::{LanguageAggregator, LanguageUsages};

/// Profile activity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStatus {
    pub followers: u64,
    pub followings: u64,
    pub public_repos_count: u64,
    /// Contribution calendar data is not collected; always 0.
    pub current_year_contributions: u64,
}

impl From<&UserProfile> for ActivityStatus {
    fn from(profile: &UserProfile) -> Self {
        Self {
            followers: profile.followers,
            followings: profile.following,
            public_repos_count: profile.public_repos,
            current_year_contributions: 0,
        }
    }
}

/// Everything the renderer draws.
///
/// Commit-based language attribution is not computed; `languages_by_commits`
/// shares the repository-based view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubStatus {
    pub languages_by_repo: Arc<LanguageUsages>,
    pub languages_by_commits: Arc<LanguageUsages>,
    pub activity: ActivityStatus,
}

impl GitHubStatus {
    pub fn new(languages: LanguageUsages, activity: ActivityStatus) -> Self {
        let languages = Arc::new(languages);
        Self {
            languages_by_repo: Arc::clone(&languages),
            languages_by_commits: languages,
            activity,
        }
    }
}

/// Language fetch outcome for one repository.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoLanguages {
    Fetched {
        repo: String,
        languages: LanguageBytes,
    },
    Failed {
        repo: String,
        reason: String,
    },
}

impl RepoLanguages {
    pub fn repo(&self) -> &str {
        match self {
            RepoLanguages::Fetched { repo, .. } | RepoLanguages::Failed { repo, .. } => repo,
        }
    }

    pub fn languages(&self) -> Option<&LanguageBytes> {
        match self {
            RepoLanguages::Fetched { languages, .. } => Some(languages),
            RepoLanguages::Failed { .. } => None,
        }
    }
}

/// A finished status plus the per-repository outcomes behind it.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: GitHubStatus,
    pub repositories: Vec<RepoLanguages>,
}

impl StatusReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.repositories.iter().filter_map(|outcome| match outcome {
            RepoLanguages::Failed { repo, reason } => Some((repo.as_str(), reason.as_str())),
            RepoLanguages::Fetched { .. } => None,
        })
    }
}

/// Builds a [`GitHubStatus`] for one user.
pub struct StatusAssembler<'a> {
    client: &'a GitHubClient,
    username: String,
    policy: CachePolicy,
}

impl<'a> StatusAssembler<'a> {
    pub fn new(client: &'a GitHubClient, username: impl Into<String>, policy: CachePolicy) -> Self {
        Self {
            client,
            username: username.into(),
            policy,
        }
    }

    /// Run all fetches and return only the status.
    pub async fn assemble(&self) -> Result<GitHubStatus> {
        Ok(self.run().await?.status)
    }

    /// Run all fetches.
    ///
    /// A failed profile or repository-list fetch fails the run. A failed
    /// language fetch only drops that repository from the statistics.
    pub async fn run(&self) -> Result<StatusReport> {
        let (profile, repos) = self.fetch_core().await?;
        info!(
            "Fetched profile for {} with {} owned repositories",
            self.username,
            repos.len()
        );

        let repositories = self.fetch_languages(&repos).await;

        let mut aggregator = LanguageAggregator::new();
        aggregator.merge_all(repositories.iter().filter_map(RepoLanguages::languages));

        let status = GitHubStatus::new(aggregator.finish(), ActivityStatus::from(&profile));
        Ok(StatusReport {
            status,
            repositories,
        })
    }

    async fn fetch_core(&self) -> Result<(UserProfile, Vec<Repository>)> {
        let (profile, repos) = tokio::join!(
            self.client.get_user(&self.username, &self.policy),
            self.client.get_owned_repos(&self.username, &self.policy),
        );

        let profile = profile.map_err(|e| StatusError::CoreFetch {
            what: "user profile",
            source: Box::new(e),
        })?;
        let repos = repos.map_err(|e| StatusError::CoreFetch {
            what: "repository list",
            source: Box::new(e),
        })?;
        Ok((profile, repos))
    }

    /// Fetch language maps one repository at a time; the client's request
    /// delay paces the calls.
    async fn fetch_languages(&self, repos: &[Repository]) -> Vec<RepoLanguages> {
        let mut outcomes = Vec::with_capacity(repos.len());
        for repo in repos {
            let outcome = match self.client.get_languages(repo, &self.policy).await {
                Ok(languages) => RepoLanguages::Fetched {
                    repo: repo.name.clone(),
                    languages,
                },
                Err(e) => {
                    warn!("Failed to fetch languages for repo {}: {}", repo.name, e);
                    RepoLanguages::Failed {
                        repo: repo.name.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
