//! Client for an OpenAI-style chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use recorder::{retry_with_backoff, RetryPolicy};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use types::{GenerationError, TextGenerator, Turn};

#[derive(Debug, Clone)]
pub struct ChatCompletionsGenerator {
    client: Client,
    endpoint: String,
    model: Option<String>,
    api_key: Option<String>,
    retry: RetryPolicy,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<Turn>,
}

impl ChatCompletionsGenerator {
    /// `attempt_timeout` bounds each HTTP attempt, so retries still fit inside a
    /// caller's overall deadline.
    pub fn new(
        endpoint: &str,
        model: Option<String>,
        attempt_timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(attempt_timeout)
            .build()
            .map_err(|e| GenerationError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model,
            api_key: None,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&mut self, conversation: &[Turn]) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: conversation.to_vec(),
        };
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();

        retry_with_backoff(
            "chat completion",
            move || {
                let client = client.clone();
                let endpoint = endpoint.clone();
                let api_key = api_key.clone();
                let request = request.clone();
                Box::pin(async move { post_chat(&client, &endpoint, api_key.as_deref(), &request).await })
            },
            self.retry,
        )
        .await
    }
}

async fn post_chat(
    client: &Client,
    endpoint: &str,
    api_key: Option<&str>,
    request: &ChatRequest,
) -> Result<String, GenerationError> {
    let mut builder = client.post(endpoint).json(request);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }
    let response = builder
        .send()
        .await
        .map_err(|e| GenerationError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        return Err(GenerationError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| GenerationError::UnrecognizedResponse(e.to_string()))?;
    log::trace!("Generation response: {body}");
    extract_reply(&body).ok_or_else(|| GenerationError::UnrecognizedResponse(body.to_string()))
}

/// Pulls the reply text out of any of the response shapes chat services commonly use:
/// `choices[0].message.content`, `choices[0].text`, `reply` or `result[0].content`.
pub fn extract_reply(body: &Value) -> Option<String> {
    let first_choice = body.get("choices").and_then(|c| c.get(0));
    let candidates = [
        first_choice
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content")),
        first_choice.and_then(|c| c.get("text")),
        body.get("reply"),
        body.get("result")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("content")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(|text| text.trim().to_string())
}
