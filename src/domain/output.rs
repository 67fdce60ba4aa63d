//! Tagged results of model calls.

use serde::{Deserialize, Serialize};

/// Shown when a phase generation fails
pub const GENERATION_FALLBACK: &str =
    "Error generating content. Please check your API key or try again.";

/// Shown when a phase generation returns no text
pub const EMPTY_GENERATION_FALLBACK: &str = "Error: No content generated.";

/// Shown when a chat turn fails
pub const CHAT_FALLBACK: &str = "I apologize, but I encountered an error processing your request.";

/// Shown when a chat turn returns no text
pub const EMPTY_CHAT_FALLBACK: &str = "Sorry, I couldn't generate a response.";

/// What a model call produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ModelOutput {
    /// Text returned by the model
    Text { content: String },

    /// The call failed; `fallback` is what the user sees
    Failed { fallback: String, reason: String },
}

impl ModelOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn failed(fallback: &str, reason: impl Into<String>) -> Self {
        Self::Failed {
            fallback: fallback.to_string(),
            reason: reason.into(),
        }
    }

    /// Text to present, the fallback for failures
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text { content } => content,
            Self::Failed { fallback, .. } => fallback,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Underlying error for failures
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Text { .. } => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }
}
