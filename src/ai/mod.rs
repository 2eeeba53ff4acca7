//! AI-generated repository narratives
//!
//! Turns a scored [`HealthModel`](crate::models::HealthModel) into a
//! [`NarrativeResult`](crate::models::NarrativeResult) by sending a
//! schema-constrained request to an LLM. Supports multiple backends
//! (Gemini, OpenAI, OpenRouter, Ollama, Anthropic) using a BYOK (bring your
//! own key) model: keys come from environment variables or the user config.
//!
//! # Environment Variables
//!
//! - `GEMINI_API_KEY`: Required for the Gemini backend (default)
//! - `OPENAI_API_KEY`: Required for the OpenAI backend
//! - `OPENROUTER_API_KEY`: Required for the OpenRouter backend
//! - `ANTHROPIC_API_KEY`: Required for the Anthropic backend
//!
//! # Example
//!
//! ```rust,ignore
//! use repolens::ai::{AiConfig, LlmClient, Narrator};
//!
//! let key = std::env::var("GEMINI_API_KEY").ok();
//! let client = LlmClient::with_key(AiConfig::default(), key)?;
//! let narrative = Narrator::new(&client).summarize(&model)?;
//! ```

mod client;
mod narrator;
mod prompts;

pub use client::{AiConfig, LlmBackend, LlmClient, StructuredGenerator, StructuredRequest};
pub use narrator::Narrator;
pub use prompts::{response_schema, NarrativePromptBuilder, SYSTEM_INSTRUCTION};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type AiResult<T> = Result<T, AiError>;
