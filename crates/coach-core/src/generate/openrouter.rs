//! OpenRouter plan generator.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; OpenRouter is
//! the default. Each attempt sends the coaching prompt, parses the completion
//! as JSON and validates it against the request.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::generator::{GenerationError, PlanGenerator};
use super::prompt::{build_system_prompt, build_user_prompt};
use super::validate::{PlanValidationError, parse_plan_json, validate_generated_plan};
use crate::schema::{PlanRequest, PlanResponse};

/// Settings for the model endpoint.
#[derive(Clone)]
pub struct ModelConfig {
    /// Bearer token for the endpoint.
    pub api_key: String,
    /// API root, e.g. `https://openrouter.ai/api/v1`.
    pub base_url: String,
    /// Model identifier, e.g. `mistralai/mistral-7b-instruct`.
    pub model: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Total attempts before giving up (at least one is always made).
    pub attempts: u32,
}

impl ModelConfig {
    pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
    pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_ATTEMPTS: u32 = 3;

    /// Config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            attempts: Self::DEFAULT_ATTEMPTS,
        }
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("attempts", &self.attempts)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// [`PlanGenerator`] backed by an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterGenerator {
    client: Client,
    config: ModelConfig,
    system_prompt: String,
}

impl OpenRouterGenerator {
    /// Build the HTTP client. The system prompt is assembled once here.
    pub fn new(config: ModelConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            system_prompt: build_system_prompt(),
        })
    }

    async fn attempt(&self, request: &PlanRequest) -> Result<PlanResponse, GenerationError> {
        let user_prompt = build_user_prompt(request);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = extract_content(&text)?;
        debug!(bytes = content.len(), "model completion received");
        let plan = parse_plan_json(&content)?;
        Ok(validate_generated_plan(request, plan)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                after: self.config.timeout,
            }
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl PlanGenerator for OpenRouterGenerator {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn generate(&self, request: &PlanRequest) -> Result<PlanResponse, GenerationError> {
        let attempts = self.config.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(request).await {
                Ok(plan) => return Ok(plan),
                Err(err) if attempt < attempts => {
                    warn!(
                        generator = self.name(),
                        attempt,
                        max = attempts,
                        kind = err.kind(),
                        error = %err,
                        "plan generation attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Pull the first choice's message text out of a completion envelope.
fn extract_content(body: &str) -> Result<String, GenerationError> {
    let envelope: ChatResponse =
        serde_json::from_str(body).map_err(PlanValidationError::from)?;
    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyCompletion)
}
