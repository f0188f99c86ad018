use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL: &str = "mistral:7b-instruct";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Application configuration loaded from environment variables.
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// When set, cases from this JSON file are upserted before the server starts.
    pub seed_cases_path: Option<PathBuf>,
    pub llm: LlmConfig,
}

/// Everything the backend invoker needs: which backend, which model, where, and how long to wait.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: String,
    pub model: String,
    pub ollama_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            seed_cases_path: optional_env("SEED_CASES_PATH").map(PathBuf::from),
            llm: LlmConfig::from_lookup(|key| std::env::var(key).ok())?,
        })
    }
}

impl LlmConfig {
    /// Reads LLM settings through `lookup` so tests can supply a fixed map
    /// instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let max_tokens = match get("LLM_MAX_TOKENS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("LLM_MAX_TOKENS must be a positive integer")?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(LlmConfig {
            backend: get("LLM_BACKEND").unwrap_or_else(|| "ollama".to_string()),
            model: get("LLM_MODEL")
                .or_else(|| get("OLLAMA_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_base_url: get("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_tokens,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_local_ollama() {
        let config = LlmConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, "ollama");
        assert_eq!(config.model, "mistral:7b-instruct");
        assert_eq!(config.ollama_url, "http://localhost:11434/api/generate");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_llm_model_takes_precedence_over_ollama_model() {
        let config = LlmConfig::from_lookup(lookup_from(&[
            ("LLM_MODEL", "gpt-4o-mini"),
            ("OLLAMA_MODEL", "llama3"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");

        let config = LlmConfig::from_lookup(lookup_from(&[("OLLAMA_MODEL", "llama3")])).unwrap();
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            LlmConfig::from_lookup(lookup_from(&[("LLM_BACKEND", "  "), ("OPENAI_API_KEY", "")]))
                .unwrap();
        assert_eq!(config.backend, "ollama");
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let err = LlmConfig::from_lookup(lookup_from(&[("LLM_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("LLM_TIMEOUT_SECS"));
    }

    #[test]
    fn test_custom_timeout_and_max_tokens() {
        let config = LlmConfig::from_lookup(lookup_from(&[
            ("LLM_TIMEOUT_SECS", "30"),
            ("LLM_MAX_TOKENS", "512"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_tokens, 512);
    }
}
