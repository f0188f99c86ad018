//! Hosted chat-completions backend (OpenAI-compatible `/v1/chat/completions`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::GRADER_SYSTEM;
use super::{endpoint, BackendFailure};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: String,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            url: endpoint(base_url, CHAT_COMPLETIONS_PATH),
            api_key,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One system + one user turn, zero temperature, bounded length.
    pub async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, BackendFailure> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: GRADER_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            return Err(BackendFailure::from_response(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "OpenAI call succeeded: prompt_tokens={:?}, completion_tokens={:?}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        Ok(text.unwrap_or_else(|| {
            warn!("OpenAI response had no message content; treating as empty text");
            String::new()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> OpenAiBackend {
        OpenAiBackend::new(
            Client::new(),
            &server.uri(),
            "test-key".to_string(),
            "gpt-4o-mini".to_string(),
            1024,
        )
    }

    #[tokio::test]
    async fn test_single_turn_deterministic_request() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/chat/completions"))
            .and(matchers::header("authorization", "Bearer test-key"))
            .and(matchers::body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "max_tokens": 1024,
                "messages": [
                    {"role": "system", "content": GRADER_SYSTEM},
                    {"role": "user", "content": "grade this"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"scores\":{\"tone\":4}}"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 30}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = backend_for(&mock_server)
            .generate("grade this", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "{\"scores\":{\"tone\":4}}");
    }

    #[tokio::test]
    async fn test_partial_usage_block_still_returns_text() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{\"scores\":{\"tone\":4}}"}}],
                "usage": {"prompt_tokens": 12}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = backend_for(&mock_server)
            .generate("prompt", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "{\"scores\":{\"tone\":4}}");
    }

    #[tokio::test]
    async fn test_auth_failure_is_api_error() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&mock_server)
            .await;

        let err = backend_for(&mock_server)
            .generate("prompt", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            BackendFailure::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quota_failure_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit exceeded"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = backend_for(&mock_server)
            .generate("prompt", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_text() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let text = backend_for(&mock_server)
            .generate("prompt", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(text.is_empty());
    }
}
