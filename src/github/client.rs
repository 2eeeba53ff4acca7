//! GitHub REST client
//!
//! Uses ureq (sync HTTP) like the LLM client. Status codes are inspected by
//! hand so the tree listing can fall back to a second branch name.

use super::{GithubError, GithubResult, RepoHost};
use crate::models::{FileEntry, FileKind, RepoRef};
use serde::Deserialize;
use std::time::Duration;
use url::Url;
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const TREE_ACCEPT: &str = "application/vnd.github.v3+json";
const RAW_ACCEPT: &str = "application/vnd.github.v3.raw";
const USER_AGENT: &str = concat!("repolens/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API base URL, without trailing slash
    pub api_url: String,
    /// Branch tried first for the tree listing
    pub primary_branch: String,
    /// Branch tried once when the primary listing is rejected
    pub fallback_branch: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            primary_branch: "main".to_string(),
            fallback_branch: "master".to_string(),
        }
    }
}

impl GithubConfig {
    /// `{api}/repos/{owner}/{name}/git/trees/{branch}?recursive=1`
    pub fn tree_url(&self, repo: &RepoRef, branch: &str) -> GithubResult<Url> {
        let mut url = self.repo_url(repo, &["git", "trees"], branch)?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    /// `{api}/repos/{owner}/{name}/contents/{path}`, each path segment
    /// percent-encoded
    pub fn contents_url(&self, repo: &RepoRef, path: &str) -> GithubResult<Url> {
        self.repo_url(repo, &["contents"], path)
    }

    fn repo_url(&self, repo: &RepoRef, prefix: &[&str], rest: &str) -> GithubResult<Url> {
        let invalid = |message: String| GithubError::ApiUrl {
            url: self.api_url.clone(),
            message,
        };

        let mut url = Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(prefix)
            .extend(rest.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

/// Result of one tree request
enum TreeAttempt {
    Listed(Vec<FileEntry>),
    Rejected { status_text: String },
}

pub struct GithubClient {
    config: GithubConfig,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Non-success statuses drive the branch fallback
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .new_agent()
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            config,
            agent: make_agent(),
        }
    }

    fn request_tree(
        &self,
        repo: &RepoRef,
        branch: &str,
        token: Option<&str>,
    ) -> GithubResult<TreeAttempt> {
        let url = self.config.tree_url(repo, branch)?;
        debug!("GET {}", url);

        let mut req = self
            .agent
            .get(url.as_str())
            .header("Accept", TREE_ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let response = req.call().map_err(|e| GithubError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            debug!("Tree request for branch '{}' rejected: {}", branch, status_text);
            return Ok(TreeAttempt::Rejected { status_text });
        }

        let listing: TreeResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GithubError::Parse(e.to_string()))?;

        if listing.truncated {
            warn!(
                "Tree listing for {} was truncated by the API; analysis sees a partial tree",
                repo.full_name()
            );
        }

        Ok(TreeAttempt::Listed(listing.into_entries()))
    }
}

/// Try the primary branch, then the fallback branch exactly once.
///
/// The error carries the status text of the second attempt.
fn list_with_fallback<F>(config: &GithubConfig, mut attempt: F) -> GithubResult<Vec<FileEntry>>
where
    F: FnMut(&str) -> GithubResult<TreeAttempt>,
{
    let primary = &config.primary_branch;
    let fallback = &config.fallback_branch;

    match attempt(primary.as_str())? {
        TreeAttempt::Listed(entries) => Ok(entries),
        TreeAttempt::Rejected { .. } => {
            info!("Branch '{}' unavailable, retrying with '{}'", primary, fallback);
            match attempt(fallback.as_str())? {
                TreeAttempt::Listed(entries) => Ok(entries),
                TreeAttempt::Rejected { status_text } => {
                    Err(GithubError::TreeUnavailable { status_text })
                }
            }
        }
    }
}

impl RepoHost for GithubClient {
    fn fetch_tree(&self, repo: &RepoRef, token: Option<&str>) -> GithubResult<Vec<FileEntry>> {
        let entries = list_with_fallback(&self.config, |branch| {
            self.request_tree(repo, branch, token)
        })?;

        info!("Listed {} entries for {}", entries.len(), repo.full_name());
        Ok(entries)
    }

    fn fetch_file_content(&self, repo: &RepoRef, path: &str, token: Option<&str>) -> String {
        let url = match self.config.contents_url(repo, path) {
            Ok(url) => url,
            Err(e) => {
                debug!("No content URL for {}: {}", path, e);
                return String::new();
            }
        };

        let mut req = self
            .agent
            .get(url.as_str())
            .header("Accept", RAW_ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let response = match req.call() {
            Ok(response) => response,
            Err(e) => {
                debug!("Content request for {} failed: {}", path, e);
                return String::new();
            }
        };

        if !response.status().is_success() {
            debug!("Content for {} unavailable: {}", path, response.status());
            return String::new();
        }

        response.into_body().read_to_string().unwrap_or_else(|e| {
            debug!("Could not read content of {}: {}", path, e);
            String::new()
        })
    }
}

// GitHub API types
#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    size: Option<u64>,
}

impl TreeResponse {
    fn into_entries(self) -> Vec<FileEntry> {
        self.tree
            .into_iter()
            .map(|item| FileEntry {
                kind: if item.item_type == "blob" {
                    FileKind::File
                } else {
                    FileKind::Dir
                },
                path: item.path,
                size: item.size,
            })
            .collect()
    }
}
