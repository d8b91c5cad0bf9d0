/// LLM Client — the single point of entry for chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the upstream AI service directly.
/// One request per call, no retries; the caller decides whether to try again.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI service unreachable: {0}")]
    Unavailable(String),

    #[error("AI service timed out after {0}s")]
    Timeout(u64),

    #[error("AI service rejected the request (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed AI service response: {0}")]
    Malformed(#[from] MalformedReason),
}

/// Why a successful HTTP exchange still did not yield assistant content.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedReason {
    #[error("response body was null")]
    NullBody,

    #[error("response body is not a chat completion: {0}")]
    InvalidEnvelope(String),

    #[error("missing 'choices' field")]
    MissingChoices,

    #[error("empty 'choices' array")]
    EmptyChoices,

    #[error("missing 'message' in first choice")]
    MissingMessage,

    #[error("missing 'message.content' in first choice")]
    MissingContent,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionEnvelope {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionEnvelope {
    fn into_content(self) -> Result<String, MalformedReason> {
        let choices = self.choices.ok_or(MalformedReason::MissingChoices)?;
        let first = choices
            .into_iter()
            .next()
            .ok_or(MalformedReason::EmptyChoices)?;
        let message = first.message.ok_or(MalformedReason::MissingMessage)?;
        message.content.ok_or(MalformedReason::MissingContent)
    }
}

/// Decodes an upstream body into the first choice's assistant content.
fn decode_envelope(body: &str) -> Result<String, MalformedReason> {
    if body.trim().is_empty() {
        return Err(MalformedReason::NullBody);
    }
    let envelope: Option<ChatCompletionEnvelope> = serde_json::from_str(body)
        .map_err(|e| MalformedReason::InvalidEnvelope(e.to_string()))?;
    envelope.ok_or(MalformedReason::NullBody)?.into_content()
}

/// Anything that can turn a prompt into raw assistant text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Chat-completion client for OpenRouter-compatible APIs.
/// Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: AiConfig,
}

impl LlmClient {
    pub fn new(config: AiConfig) -> Result<Self, reqwest::Error> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is DISABLED for the AI service client");
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn classify(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            error!("Timeout calling AI service: {e}");
            LlmError::Timeout(self.config.timeout.as_secs())
        } else if e.is_connect() {
            error!("Connection error to AI service: {e}");
            LlmError::Unavailable(e.to_string())
        } else {
            error!("Error calling AI service: {e}");
            LlmError::Unavailable(e.to_string())
        }
    }

    /// Sends `prompt` as a single user message and returns `choices[0].message.content`.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        info!(model = %self.config.model, prompt_chars = prompt.len(), "Sending chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", format!("https://{}.app", self.config.app_name))
            .header("X-Title", &self.config.app_name)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if status.is_client_error() || status.is_server_error() {
            error!(status = status.as_u16(), "AI service error: {body}");
            return Err(LlmError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let content = decode_envelope(&body).map_err(|reason| {
            error!("Invalid AI service response ({reason}): {body}");
            LlmError::Malformed(reason)
        })?;

        debug!(content_chars = content.len(), "Received AI response content");
        Ok(content)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(prompt).await
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::{http::StatusCode, routing::post, Router};

    use crate::config::AiConfig;

    /// Serves a fixed status and body on `/chat/completions`, after an optional delay.
    pub async fn fake_upstream(status: StatusCode, body: &'static str, delay: Duration) -> SocketAddr {
        let app = Router::new().route(
            "/chat/completions",
            post(move || async move {
                tokio::time::sleep(delay).await;
                (status, body)
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    pub fn ai_config(base_url: String, timeout: Duration) -> AiConfig {
        AiConfig {
            api_key: "test-key".to_string(),
            base_url,
            model: "test/model".to_string(),
            app_name: "careerbooster".to_string(),
            timeout,
            accept_invalid_certs: false,
        }
    }

    pub fn config_for(addr: SocketAddr) -> AiConfig {
        ai_config(format!("http://{addr}"), Duration::from_secs(5))
    }
}
