//! Chat transcript entries and speaking roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opening message of every transcript
pub const GREETING: &str = "I have analyzed the case files. Please select your role \
(Plaintiff, Defendant, or Judge) and I will assist you accordingly.";

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Judge,
    Plaintiff,
    Defendant,
    Assistant,
}

impl Speaker {
    /// Roles a user may speak as
    pub const USER_ROLES: [Speaker; 3] = [Speaker::Plaintiff, Speaker::Defendant, Speaker::Judge];

    /// Name used in transcripts and role prefixes
    pub fn label(self) -> &'static str {
        match self {
            Speaker::Judge => "Judge",
            Speaker::Plaintiff => "Plaintiff",
            Speaker::Defendant => "Defendant",
            Speaker::Assistant => "Legal Assistant",
        }
    }

    pub fn is_assistant(self) -> bool {
        self == Speaker::Assistant
    }
}

impl Default for Speaker {
    fn default() -> Self {
        Speaker::Plaintiff
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Speaker {
    type Err = UnknownRole;

    /// Parses user roles only; the assistant cannot be impersonated
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "judge" => Ok(Speaker::Judge),
            "plaintiff" => Ok(Speaker::Plaintiff),
            "defendant" => Ok(Speaker::Defendant),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Role name that is not judge, plaintiff or defendant
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown role '{0}' (expected judge, plaintiff or defendant)")]
pub struct UnknownRole(pub String);

/// One entry of the chat transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,

    /// Assistant entry standing in for a failed model call
    #[serde(default)]
    pub failed: bool,
}

impl ChatMessage {
    /// Create a message stamped with the current time
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            failed: false,
        }
    }

    pub fn greeting() -> Self {
        Self::new(Speaker::Assistant, GREETING)
    }

    pub fn with_failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }

    /// Content as forwarded to the model, prefixed with the role for user turns
    pub fn annotated(&self) -> String {
        if self.role.is_assistant() {
            self.content.clone()
        } else {
            role_prefixed(self.role, &self.content)
        }
    }
}

/// `[Role: <role>] <content>`
pub fn role_prefixed(role: Speaker, content: &str) -> String {
    format!("[Role: {}] {}", role.label(), content)
}
