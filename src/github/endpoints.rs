// GitHub API endpoint functions.
// Typed wrappers over `GitHubClient::fetch` for the resources the status needs.

use crate::cache::CachePolicy;
use crate::error::Result;

use super::client::GitHubClient;
use super::types::{LanguageBytes, Repository, UserProfile};

/// Repositories requested per page; only the first page is read.
pub const REPOS_PER_PAGE: u32 = 100;

/// Path of a user's public profile.
pub fn user_path(login: &str) -> String {
    format!("/users/{}", login)
}

/// Path of the repositories a user owns.
pub fn owned_repos_path(login: &str) -> String {
    format!("/users/{}/repos?per_page={}&type=owner", login, REPOS_PER_PAGE)
}

impl GitHubClient {
    /// Get a user's public profile.
    pub async fn get_user(&self, login: &str, policy: &CachePolicy) -> Result<UserProfile> {
        self.fetch(&user_path(login), policy).await
    }

    /// Get the first page of repositories owned by a user.
    pub async fn get_owned_repos(
        &self,
        login: &str,
        policy: &CachePolicy,
    ) -> Result<Vec<Repository>> {
        self.fetch(&owned_repos_path(login), policy).await
    }

    /// Get language byte counts for a repository.
    pub async fn get_languages(
        &self,
        repo: &Repository,
        policy: &CachePolicy,
    ) -> Result<LanguageBytes> {
        let path = self.relative_path(&repo.languages_url).to_string();
        self.fetch(&path, policy).await
    }
}
