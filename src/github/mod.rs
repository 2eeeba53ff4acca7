//! Repository access over the GitHub REST API
//!
//! Two reads are needed by the analyzer: the recursive tree listing and the
//! raw content of single files. Both go through the [`RepoHost`] trait so the
//! analyzer and the session can be driven by an in-memory host in tests.
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN`: Optional access token, sent as a bearer token
//! - `REPOLENS_GITHUB_API`: Override the API base URL (GitHub Enterprise)

mod client;

pub use client::{GithubClient, GithubConfig};

use crate::models::{FileEntry, RepoRef};
use thiserror::Error;

/// Errors that can occur while listing a repository
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Failed to fetch repository tree: {status_text}")]
    TreeUnavailable { status_text: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to parse repository tree: {0}")]
    Parse(String),

    #[error("Invalid API base URL '{url}': {message}")]
    ApiUrl { url: String, message: String },
}

pub type GithubResult<T> = Result<T, GithubError>;

/// Read access to a hosted repository
pub trait RepoHost: Send + Sync {
    /// Recursive listing of the default branch
    fn fetch_tree(&self, repo: &RepoRef, token: Option<&str>) -> GithubResult<Vec<FileEntry>>;

    /// Raw content of one file.
    ///
    /// Returns an empty string when the content is unavailable; callers must
    /// not read that as an authoritative empty file.
    fn fetch_file_content(&self, repo: &RepoRef, path: &str, token: Option<&str>) -> String;
}
