/// LLM Client — the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call a model provider directly.
/// Grading goes through a `TextGenerator`, and the concrete `Backend` is picked
/// once at startup from `LlmConfig`.
///
/// Calls are stateless: one request per prompt, no retry, no caching, no streaming.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod prompts;

use anthropic::AnthropicBackend;
use ollama::OllamaBackend;
use openai::OpenAiBackend;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Unknown or missing backend selection, or missing credentials. Raised before any request.
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    /// A recognized backend that has no implementation yet.
    #[error("LLM backend '{0}' is not supported yet")]
    NotSupported(BackendKind),

    #[error("{backend} backend failed: {source}")]
    Backend {
        backend: BackendKind,
        #[source]
        source: BackendFailure,
    },
}

#[derive(Debug, Error)]
pub enum BackendFailure {
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl BackendFailure {
    /// Classifies a transport error, keeping timeouts distinct.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            BackendFailure::Timeout(timeout)
        } else {
            BackendFailure::Http(err)
        }
    }

    /// Builds an `Api` failure from a non-success response, preferring the provider's message.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProviderError>(&body)
            .ok()
            .and_then(|e| e.message())
            .unwrap_or(body);
        BackendFailure::Api { status, message }
    }
}

/// Error envelope shared by the providers: `{"error": "..."}` (Ollama) or
/// `{"error": {"message": "..."}}` (OpenAI, Anthropic).
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: serde_json::Value,
}

impl ProviderError {
    fn message(self) -> Option<String> {
        match self.error {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend selection
// ────────────────────────────────────────────────────────────────────────────

/// The closed set of backends the selector may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    OpenAi,
    Anthropic,
    Bedrock,
    Vertex,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Bedrock => "bedrock",
            BackendKind::Vertex => "vertex",
        }
    }

    /// Recognized backends that have a working implementation.
    pub fn is_implemented(&self) -> bool {
        matches!(
            self,
            BackendKind::Ollama | BackendKind::OpenAi | BackendKind::Anthropic
        )
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = LlmError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "openai" => Ok(BackendKind::OpenAi),
            "anthropic" => Ok(BackendKind::Anthropic),
            "bedrock" => Ok(BackendKind::Bedrock),
            "vertex" => Ok(BackendKind::Vertex),
            "" => Err(LlmError::Configuration(
                "no LLM backend selected (set LLM_BACKEND)".to_string(),
            )),
            other => Err(LlmError::Configuration(format!(
                "unrecognized LLM backend '{other}' (expected one of: ollama, openai, anthropic, bedrock, vertex)"
            ))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capability interface
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can turn a prompt into raw text.
///
/// Implemented by `Backend`; tests substitute stubs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn backend(&self) -> BackendKind;

    /// Model identifier recorded on every review produced with this generator.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError>;
}

/// A concrete backend, chosen once from configuration.
#[derive(Debug, Clone)]
pub enum Backend {
    Ollama(OllamaBackend),
    OpenAi(OpenAiBackend),
    Anthropic(AnthropicBackend),
    /// Recognized but unimplemented; every call fails with `NotSupported`.
    Unavailable { kind: BackendKind, model: String },
}

impl Backend {
    /// Builds the backend named by `config.backend`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::for_selector(&config.backend, config)
    }

    /// Builds the backend named by `selector`, using the rest of `config` for
    /// endpoints and credentials. Never performs network activity.
    pub fn for_selector(selector: &str, config: &LlmConfig) -> Result<Self, LlmError> {
        let kind: BackendKind = selector.parse()?;
        let model = config.model.clone();

        let backend = match kind {
            BackendKind::Ollama => {
                Backend::Ollama(OllamaBackend::new(http_client()?, &config.ollama_url, model))
            }
            BackendKind::OpenAi => {
                let api_key = require_key(config.openai_api_key.as_deref(), "OPENAI_API_KEY")?;
                Backend::OpenAi(OpenAiBackend::new(
                    http_client()?,
                    &config.openai_base_url,
                    api_key,
                    model,
                    config.max_tokens,
                ))
            }
            BackendKind::Anthropic => {
                let api_key =
                    require_key(config.anthropic_api_key.as_deref(), "ANTHROPIC_API_KEY")?;
                Backend::Anthropic(AnthropicBackend::new(
                    http_client()?,
                    &config.anthropic_base_url,
                    api_key,
                    model,
                    config.max_tokens,
                ))
            }
            BackendKind::Bedrock | BackendKind::Vertex => Backend::Unavailable { kind, model },
        };

        debug!("Selected LLM backend {} (model: {})", kind, backend.model());
        Ok(backend)
    }
}

#[async_trait]
impl TextGenerator for Backend {
    fn backend(&self) -> BackendKind {
        match self {
            Backend::Ollama(_) => BackendKind::Ollama,
            Backend::OpenAi(_) => BackendKind::OpenAi,
            Backend::Anthropic(_) => BackendKind::Anthropic,
            Backend::Unavailable { kind, .. } => *kind,
        }
    }

    fn model(&self) -> &str {
        match self {
            Backend::Ollama(b) => b.model(),
            Backend::OpenAi(b) => b.model(),
            Backend::Anthropic(b) => b.model(),
            Backend::Unavailable { model, .. } => model,
        }
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        let result = match self {
            Backend::Ollama(b) => b.generate(prompt, timeout).await,
            Backend::OpenAi(b) => b.generate(prompt, timeout).await,
            Backend::Anthropic(b) => b.generate(prompt, timeout).await,
            Backend::Unavailable { kind, .. } => return Err(LlmError::NotSupported(*kind)),
        };

        result.map_err(|source| LlmError::Backend {
            backend: self.backend(),
            source,
        })
    }
}

fn http_client() -> Result<Client, LlmError> {
    Client::builder()
        .build()
        .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))
}

fn require_key(key: Option<&str>, var: &str) -> Result<String, LlmError> {
    key.map(str::to_string)
        .ok_or_else(|| LlmError::Configuration(format!("{var} must be set for this backend")))
}

/// Joins a base URL and an API path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
