//! LLM API client supporting Gemini, OpenAI-compatible and Anthropic backends
//!
//! Every backend is asked for a single JSON object constrained by a JSON
//! Schema. Gemini takes the schema natively, OpenAI-compatible backends get
//! it as a `response_format`, and Anthropic gets it appended to the system
//! instruction. Uses ureq (sync HTTP); no async runtime needed.

use crate::ai::{AiError, AiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    Gemini,
    OpenAi,
    OpenRouter,
    Ollama,
    Anthropic,
}

impl LlmBackend {
    pub const ALL: [LlmBackend; 5] = [
        LlmBackend::Gemini,
        LlmBackend::OpenAi,
        LlmBackend::OpenRouter,
        LlmBackend::Ollama,
        LlmBackend::Anthropic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "gemini",
            LlmBackend::OpenAi => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::Anthropic => "anthropic",
        }
    }

    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "GEMINI_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::OpenRouter => "OPENROUTER_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn signup_url(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "https://aistudio.google.com/apikey",
            LlmBackend::OpenAi => "https://platform.openai.com/api-keys",
            LlmBackend::OpenRouter => "https://openrouter.ai/keys",
            LlmBackend::Ollama => "https://ollama.ai (no key needed, just run locally)",
            LlmBackend::Anthropic => "https://console.anthropic.com/settings/keys",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "gemini-3-flash-preview",
            LlmBackend::OpenAi => "gpt-4o",
            LlmBackend::OpenRouter => "google/gemini-2.5-flash",
            LlmBackend::Ollama => "llama3.1:8b",
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmBackend::Ollama)
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LlmBackend {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LlmBackend::ALL
            .into_iter()
            .find(|b| b.name() == wanted)
            .ok_or_else(|| {
                AiError::Config(format!(
                    "Unknown AI backend '{}'. Expected one of: gemini, openai, openrouter, ollama, anthropic",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Base URL of a local Ollama server
    pub ollama_url: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            max_tokens: 8192,
            temperature: 0.2,
            ollama_url: "http://localhost:11434".to_string(),
        }
    }
}

impl AiConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Full request URL for the configured backend and model
    pub fn endpoint(&self) -> String {
        match self.backend {
            LlmBackend::Gemini => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model()
            ),
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions".to_string(),
            LlmBackend::OpenRouter => "https://openrouter.ai/api/v1/chat/completions".to_string(),
            LlmBackend::Ollama => format!(
                "{}/v1/chat/completions",
                self.ollama_url.trim_end_matches('/')
            ),
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages".to_string(),
        }
    }
}

/// One schema-constrained generation call
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system: String,
    pub prompt: String,
    /// JSON Schema the response must satisfy
    pub schema: serde_json::Value,
}

/// Anything that can answer a [`StructuredRequest`] with raw JSON text
pub trait StructuredGenerator {
    fn generate_json(&self, request: &StructuredRequest) -> AiResult<String>;
}

/// Unified LLM client over sync HTTP
pub struct LlmClient {
    config: AiConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(std::time::Duration::from_secs(120)))
        .build()
        .new_agent()
}

impl LlmClient {
    pub fn new(config: AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            agent: make_agent(),
        }
    }

    /// Build a client from an optional key, failing when the backend needs one
    pub fn with_key(config: AiConfig, api_key: Option<String>) -> AiResult<Self> {
        if !config.backend.requires_api_key() {
            return Ok(Self::new(config, "ollama"));
        }

        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok(Self::new(config, key)),
            None => Err(AiError::MissingApiKey {
                env_var: config.backend.env_key().to_string(),
                signup_url: config.backend.signup_url().to_string(),
            }),
        }
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// POST `body` and decode a success response as `R`
    fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        headers: &[(&str, String)],
        body: &T,
    ) -> AiResult<R> {
        let url = self.config.endpoint();
        debug!("POST {} ({})", url, self.model());

        let mut req = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }

        let response = req.send_json(body).map_err(|e| AiError::Api {
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::Api {
                status,
                message: error_text,
            });
        }

        response
            .into_body()
            .read_json()
            .map_err(|e| AiError::Parse(e.to_string()))
    }

    fn generate_gemini(&self, request: &StructuredRequest) -> AiResult<String> {
        let body = gemini_body(&self.config, request);
        let resp: GeminiResponse =
            self.post_json(&[("x-goog-api-key", self.api_key.clone())], &body)?;

        let text: String = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AiError::Parse("No text content in response".to_string()));
        }
        Ok(text)
    }

    fn generate_openai(&self, request: &StructuredRequest) -> AiResult<String> {
        let body = openai_body(&self.config, request);

        let mut headers = Vec::new();
        if self.config.backend.requires_api_key() {
            headers.push(("Authorization", format!("Bearer {}", self.api_key)));
        }

        let resp: OpenAiResponse = self.post_json(&headers, &body)?;
        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::Parse("No response choices".to_string()))
    }

    fn generate_anthropic(&self, request: &StructuredRequest) -> AiResult<String> {
        let body = anthropic_body(&self.config, request);
        let headers = [
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", "2023-06-01".to_string()),
        ];

        let resp: AnthropicResponse = self.post_json(&headers, &body)?;
        resp.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or_else(|| AiError::Parse("No text content in response".to_string()))
    }
}

impl StructuredGenerator for LlmClient {
    fn generate_json(&self, request: &StructuredRequest) -> AiResult<String> {
        match self.config.backend {
            LlmBackend::Gemini => self.generate_gemini(request),
            LlmBackend::Anthropic => self.generate_anthropic(request),
            _ => self.generate_openai(request),
        }
    }
}

fn gemini_body(config: &AiConfig, request: &StructuredRequest) -> serde_json::Value {
    json!({
        "systemInstruction": { "parts": [{ "text": request.system }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseJsonSchema": request.schema,
            "temperature": config.temperature,
            "maxOutputTokens": config.max_tokens,
        }
    })
}

fn openai_body(config: &AiConfig, request: &StructuredRequest) -> OpenAiRequest {
    OpenAiRequest {
        model: config.model().to_string(),
        messages: vec![
            Message::system(&request.system),
            Message::user(&request.prompt),
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        response_format: json!({
            "type": "json_schema",
            "json_schema": {
                "name": "repository_narrative",
                "schema": request.schema,
            }
        }),
    }
}

fn anthropic_body(config: &AiConfig, request: &StructuredRequest) -> AnthropicRequest {
    let schema = serde_json::to_string_pretty(&request.schema).unwrap_or_default();
    AnthropicRequest {
        model: config.model().to_string(),
        max_tokens: config.max_tokens,
        messages: vec![Message::user(&request.prompt)],
        system: Some(format!(
            "{}\n\nRespond with a single JSON object that validates against this JSON Schema:\n{}",
            request.system, schema
        )),
        temperature: Some(config.temperature),
    }
}

// Gemini API types
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

// OpenAI API types
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

// Anthropic API types
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
