//! Local inference backend (Ollama `/api/generate`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::BackendFailure;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    eval_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(client: Client, url: &str, model: String) -> Self {
        Self {
            client,
            url: url.to_string(),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single non-streaming generation. A body without `response` yields empty text.
    pub async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, BackendFailure> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            return Err(BackendFailure::from_response(response).await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        debug!(
            "Ollama call succeeded: model={}, eval_count={:?}",
            self.model, parsed.eval_count
        );

        Ok(parsed.response.unwrap_or_else(|| {
            warn!("Ollama response had no 'response' field; treating as empty text");
            String::new()
        }))
    }
}
