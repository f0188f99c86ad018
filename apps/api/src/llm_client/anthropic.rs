//! Hosted messages backend (Anthropic `/v1/messages`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::GRADER_SYSTEM;
use super::{endpoint, BackendFailure};

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl MessagesResponse {
    /// Text of the first text block.
    fn text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: String,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            url: endpoint(base_url, MESSAGES_PATH),
            api_key,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, BackendFailure> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system: GRADER_SYSTEM,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            return Err(BackendFailure::from_response(response).await);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Anthropic call succeeded: input_tokens={:?}, output_tokens={:?}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(parsed.text().unwrap_or_else(|| {
            warn!("Anthropic response had no text block; treating as empty text");
            String::new()
        }))
    }
}
