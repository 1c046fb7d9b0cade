//! OpenAI-compatible chat-completions client.
//!
//! One client instance is built at process startup and shared across
//! concurrent pipeline runs. It owns the bounded retry/timeout policy: a
//! 30-second per-request timeout on the underlying HTTP client and up to
//! three attempts per logical completion.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerationError;

use super::retry::retry_with_backoff;
use super::{CompletionRequest, TextGenerator};

/// Per-request timeout, matching the capability contract.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL (used by tests and
/// OpenAI-compatible gateways).
pub const BASE_URL_ENV_VAR: &str = "CHRONIK_OPENAI_BASE_URL";

pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Build a client against an explicit endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GenerationError::RequestFailed)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from the environment: `OPENAI_API_KEY` (required) and
    /// `CHRONIK_OPENAI_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let base_url =
            env::var(BASE_URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self::new(base_url, api_key)
    }

    /// One HTTP exchange: POST /chat/completions, parse out the first
    /// choice's message content.
    async fn request_once(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatCompletionBody {
            model: &request.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatRequestMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(GenerationError::RequestFailed)?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        debug!(model = %request.model, "Requesting completion");

        // Transport and status failures are retried with backoff; a
        // successful exchange that carries no text is final.
        let content = retry_with_backoff(
            || async {
                self.request_once(request).await.inspect_err(|e| {
                    warn!(model = %request.model, error = %e, "Completion attempt failed");
                })
            },
            |e| GenerationError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        match content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenerationError::EmptyResponse),
        }
    }
}
