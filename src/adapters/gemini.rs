//! Gemini adapter over the `generateContent` REST endpoint.
//!
//! Both entry points are a single request/response round trip. Chat replays
//! the whole history on every call; no remote session is kept.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts::{chat_system_instruction, generation_prompt};
use super::{ChatTurn, GatewayError, ModelGateway, TurnRole};
use crate::config::ResolvedConfig;

/// Default API root
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini gateway using the REST API
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: TurnRole,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl<'a> Content<'a> {
    fn new(role: TurnRole, text: &'a str) -> Self {
        Self {
            role,
            parts: vec![TextPart { text }],
        }
    }
}

impl GeminiGateway {
    /// Create a gateway with explicit settings and no request timeout
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            api_base: api_base.into(),
            language: language.into(),
        }
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let mut gateway = Self::new(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base.clone(),
            config.language.clone(),
        );

        if let Some(timeout) = config.timeout {
            gateway.client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?;
        }

        Ok(gateway)
    }

    /// Build the endpoint URL (the key travels in a header, never in the URL)
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    async fn send(&self, request: &GenerateContentRequest<'_>) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = response_text(&parsed);
        debug!(chars = text.len(), "Model response received");

        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Concatenated text parts of the first candidate
fn response_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Error message from an API error body, or the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Contents for a chat call: replayed history then the new user message.
///
/// The API requires the conversation to open with a user turn, so leading
/// model turns (the greeting) are left out.
fn chat_contents<'a>(history: &'a [ChatTurn], message: &'a str) -> Vec<Content<'a>> {
    history
        .iter()
        .skip_while(|turn| turn.role == TurnRole::Model)
        .map(|turn| Content::new(turn.role, &turn.text))
        .chain(std::iter::once(Content::new(TurnRole::User, message)))
        .collect()
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, instruction: &str, context: &str) -> Result<String, GatewayError> {
        let prompt = generation_prompt(instruction, context, &self.language);
        let request = GenerateContentRequest {
            contents: vec![Content::new(TurnRole::User, &prompt)],
            system_instruction: None,
        };
        self.send(&request).await
    }

    async fn chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, GatewayError> {
        let system = chat_system_instruction(context, &self.language);
        let request = GenerateContentRequest {
            contents: chat_contents(history, message),
            system_instruction: Some(SystemInstruction {
                parts: vec![TextPart { text: &system }],
            }),
        };
        self.send(&request).await
    }
}
