//! Configuration module for RepoLens
//!
//! This module handles:
//! - User-level configuration (~/.config/repolens/config.toml)
//! - LLM backend selection and API keys
//! - Repository host settings (API base URL, branch names, token)

mod user_config;

pub use user_config::{mask_secret, AiConfig, GithubSection, UserConfig, SETTABLE_KEYS};
