//! Gateway interface to the hosted language model.
//!
//! The gateway is the only component that talks to the model. It has two
//! entry points: one-shot generation for a court phase and multi-turn chat.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ChatMessage;

// Re-export the Gemini gateway
pub use gemini::GeminiGateway;

/// Author of a turn on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// A replayed conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

impl From<&ChatMessage> for ChatTurn {
    fn from(message: &ChatMessage) -> Self {
        if message.role.is_assistant() {
            ChatTurn::model(message.annotated())
        } else {
            ChatTurn::user(message.annotated())
        }
    }
}

/// Failures talking to the model
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no content")]
    EmptyResponse,
}

/// Trait for model backends
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Generate text for a task instruction against the case context
    async fn generate(&self, instruction: &str, context: &str) -> Result<String, GatewayError>;

    /// Answer `message` after replaying `history`, with the context in the system instruction
    async fn chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, GatewayError>;
}
