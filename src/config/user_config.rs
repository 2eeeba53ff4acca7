//! User-level configuration for repolens
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/repolens/config.toml

use crate::ai::{AiConfig as ClientConfig, AiResult, LlmBackend};
use crate::github::GithubConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Keys accepted by `repolens config set`
pub const SETTABLE_KEYS: [&str; 11] = [
    "ai.backend",
    "ai.model",
    "ai.gemini_api_key",
    "ai.openai_api_key",
    "ai.anthropic_api_key",
    "ai.openrouter_api_key",
    "ai.ollama_url",
    "github.api_url",
    "github.primary_branch",
    "github.fallback_branch",
    "github.token",
];

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub github: GithubSection,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct AiConfig {
    /// AI backend: "gemini" (default), "openai", "openrouter", "ollama", "anthropic"
    pub backend: Option<String>,

    /// Model override for the selected backend
    pub model: Option<String>,

    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,

    /// Ollama URL (default: http://localhost:11434)
    pub ollama_url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct GithubSection {
    /// REST API base URL (default: https://api.github.com)
    pub api_url: Option<String>,
    pub primary_branch: Option<String>,
    pub fallback_branch: Option<String>,
    /// Access token used when none is stored or passed on the command line
    pub token: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/repolens/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = match Self::user_config_path().filter(|p| p.exists()) {
            Some(path) => Self::load_file(&path)?,
            None => UserConfig::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse one config file, without environment overrides
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repolens").join("config.toml"))
    }

    /// Environment variables override file values
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY") {
            self.ai.gemini_api_key = Some(key);
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(key) = var("OPENROUTER_API_KEY") {
            self.ai.openrouter_api_key = Some(key);
        }
        if let Some(model) = var("OLLAMA_MODEL") {
            if self.backend().ok() == Some(LlmBackend::Ollama) {
                self.ai.model = Some(model);
            }
        }
        if let Some(token) = var("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = var("REPOLENS_GITHUB_API") {
            self.github.api_url = Some(url);
        }
    }

    /// Get the AI backend (gemini unless configured)
    pub fn backend(&self) -> AiResult<LlmBackend> {
        match self.ai.backend.as_deref() {
            Some(name) => name.parse(),
            None => Ok(LlmBackend::default()),
        }
    }

    /// Key configured for `backend`, if any
    pub fn api_key(&self, backend: LlmBackend) -> Option<&str> {
        match backend {
            LlmBackend::Gemini => self.ai.gemini_api_key.as_deref(),
            LlmBackend::OpenAi => self.ai.openai_api_key.as_deref(),
            LlmBackend::Anthropic => self.ai.anthropic_api_key.as_deref(),
            LlmBackend::OpenRouter => self.ai.openrouter_api_key.as_deref(),
            LlmBackend::Ollama => None,
        }
    }

    /// Get Ollama URL
    pub fn ollama_url(&self) -> &str {
        self.ai
            .ollama_url
            .as_deref()
            .unwrap_or("http://localhost:11434")
    }

    /// Client settings for the configured backend
    pub fn client_config(&self) -> AiResult<ClientConfig> {
        Ok(ClientConfig {
            backend: self.backend()?,
            model: self.ai.model.clone(),
            ollama_url: self.ollama_url().to_string(),
            ..Default::default()
        })
    }

    /// Repository host settings, defaults filled in
    pub fn github_config(&self) -> GithubConfig {
        let defaults = GithubConfig::default();
        GithubConfig {
            api_url: self.github.api_url.clone().unwrap_or(defaults.api_url),
            primary_branch: self
                .github
                .primary_branch
                .clone()
                .unwrap_or(defaults.primary_branch),
            fallback_branch: self
                .github
                .fallback_branch
                .clone()
                .unwrap_or(defaults.fallback_branch),
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Set one dotted key, e.g. `ai.backend`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());

        if key == "ai.backend" {
            if let Some(name) = &value {
                name.parse::<LlmBackend>()?;
            }
        }

        let slot = match key {
            "ai.backend" => &mut self.ai.backend,
            "ai.model" => &mut self.ai.model,
            "ai.gemini_api_key" => &mut self.ai.gemini_api_key,
            "ai.openai_api_key" => &mut self.ai.openai_api_key,
            "ai.anthropic_api_key" => &mut self.ai.anthropic_api_key,
            "ai.openrouter_api_key" => &mut self.ai.openrouter_api_key,
            "ai.ollama_url" => &mut self.ai.ollama_url,
            "github.api_url" => &mut self.github.api_url,
            "github.primary_branch" => &mut self.github.primary_branch,
            "github.fallback_branch" => &mut self.github.fallback_branch,
            "github.token" => &mut self.github.token,
            other => bail!(
                "Unknown config key '{}'. Valid keys: {}",
                other,
                SETTABLE_KEYS.join(", ")
            ),
        };
        *slot = value;
        Ok(())
    }

    /// Write this config to `path` as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Copy with every secret masked, for display
    pub fn redacted(&self) -> UserConfig {
        let mut shown = self.clone();
        for secret in [
            &mut shown.ai.gemini_api_key,
            &mut shown.ai.openai_api_key,
            &mut shown.ai.anthropic_api_key,
            &mut shown.ai.openrouter_api_key,
            &mut shown.github.token,
        ] {
            if let Some(value) = secret.as_mut() {
                *value = mask_secret(value);
            }
        }
        shown
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# RepoLens User Configuration

[ai]
# Backend: "gemini" (default), "openai", "openrouter", "anthropic" or "ollama" (free, local)
# backend = "gemini"
# model = "gemini-3-flash-preview"

# Keys can also come from GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY, OPENROUTER_API_KEY
# gemini_api_key = "..."

# For Ollama backend (free, runs locally)
# ollama_url = "http://localhost:11434"

[github]
# api_url = "https://api.github.com"   # or REPOLENS_GITHUB_API
# primary_branch = "main"
# fallback_branch = "master"
# token = "ghp_..."                    # or GITHUB_TOKEN
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}

/// Keep the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert_eq!(config.backend().unwrap(), LlmBackend::Gemini);
        assert_eq!(config.ollama_url(), "http://localhost:11434");
        assert!(config.api_key(LlmBackend::Gemini).is_none());
        assert!(config.github_token().is_none());

        let github = config.github_config();
        assert_eq!(github.api_url, "https://api.github.com");
        assert_eq!(github.primary_branch, "main");
        assert_eq!(github.fallback_branch, "master");
    }

    #[test]
    fn test_toml_parsing_sections() {
        let toml_str = r#"
[ai]
backend = "openrouter"
model = "google/gemini-2.5-pro"
openrouter_api_key = "sk-or-123"

[github]
api_url = "https://ghe.example.com/api/v3"
primary_branch = "trunk"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend().unwrap(), LlmBackend::OpenRouter);
        assert_eq!(config.api_key(LlmBackend::OpenRouter), Some("sk-or-123"));

        let client = config.client_config().unwrap();
        assert_eq!(client.model(), "google/gemini-2.5-pro");

        let github = config.github_config();
        assert_eq!(github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(github.primary_branch, "trunk");
        assert_eq!(github.fallback_branch, "master");
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_invalid_toml_does_not_crash() {
        let bad_toml = "this is [[ not valid toml {{{}}}";
        assert!(toml::from_str::<UserConfig>(bad_toml).is_err());
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let config: UserConfig = toml::from_str("[ai]\nbackend = \"claude\"").unwrap();
        assert!(config.backend().is_err());
        assert!(config.client_config().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: UserConfig =
            toml::from_str("[ai]\ngemini_api_key = \"from-file\"\n[github]\ntoken = \"file-token\"")
                .unwrap();
        config.apply_env(env(&[
            ("GEMINI_API_KEY", "from-env"),
            ("GITHUB_TOKEN", ""),
            ("REPOLENS_GITHUB_API", "http://localhost:8080"),
        ]));
        assert_eq!(config.api_key(LlmBackend::Gemini), Some("from-env"));
        assert_eq!(config.github_token(), Some("file-token"));
        assert_eq!(config.github_config().api_url, "http://localhost:8080");
    }

    #[test]
    fn test_ollama_model_env_only_for_ollama() {
        let mut config = UserConfig::default();
        config.apply_env(env(&[("OLLAMA_MODEL", "qwen2.5")]));
        assert!(config.ai.model.is_none());

        config.set("ai.backend", "ollama").unwrap();
        config.apply_env(env(&[("OLLAMA_MODEL", "qwen2.5")]));
        assert_eq!(config.ai.model.as_deref(), Some("qwen2.5"));
    }

    #[test]
    fn test_set_validates_keys_and_backends() {
        let mut config = UserConfig::default();
        config.set("github.primary_branch", "develop").unwrap();
        assert_eq!(config.github_config().primary_branch, "develop");

        config.set("github.primary_branch", "").unwrap();
        assert_eq!(config.github_config().primary_branch, "main");

        assert!(config.set("ai.backend", "gpt").is_err());
        assert!(config.set("ai.temperature", "1").is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("repolens").join("config.toml");

        let mut config = UserConfig::default();
        config.set("ai.backend", "openai").unwrap();
        config.set("ai.openai_api_key", "sk-test").unwrap();
        config.save(&path).unwrap();

        let loaded = UserConfig::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = UserConfig::default();
        config.ai.gemini_api_key = Some("AIzaSyA-1234567890abcd".to_string());
        config.github.token = Some("short".to_string());

        let shown = config.redacted();
        assert_eq!(shown.ai.gemini_api_key.as_deref(), Some("****abcd"));
        assert_eq!(shown.github.token.as_deref(), Some("****"));
        assert_eq!(config.github.token.as_deref(), Some("short"));
    }

    #[test]
    fn test_user_config_path_returns_some() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("repolens/config.toml"));
        }
    }
}
