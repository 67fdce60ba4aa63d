//! Chat transcript with a selected speaking role.

use thiserror::Error;

use crate::adapters::ChatTurn;
use crate::domain::{ChatMessage, ModelOutput, Speaker};

/// Rejected chat sends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A reply is still pending")]
    Busy,
}

/// Linear transcript; entries are never edited or removed
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    role: Speaker,
    pending: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Start a transcript with the assistant greeting, speaking as plaintiff
    pub fn new() -> Self {
        Self {
            transcript: vec![ChatMessage::greeting()],
            role: Speaker::default(),
            pending: false,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn role(&self) -> Speaker {
        self.role
    }

    /// Whether a reply is awaited
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Change the speaking role; the assistant role is not selectable
    pub fn select_role(&mut self, role: Speaker) -> bool {
        if role.is_assistant() {
            return false;
        }
        self.role = role;
        true
    }

    /// Check that `content` may be sent now
    pub fn check_send(&self, content: &str) -> Result<(), ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.pending {
            return Err(ChatError::Busy);
        }
        Ok(())
    }

    /// Append the user message and return the replayed history plus the
    /// role-annotated message to forward
    pub fn submit(&mut self, content: &str) -> Result<(Vec<ChatTurn>, String), ChatError> {
        self.check_send(content)?;

        let history = self.transcript.iter().map(ChatTurn::from).collect();
        let message = ChatMessage::new(self.role, content);
        let annotated = message.annotated();

        self.transcript.push(message);
        self.pending = true;
        Ok((history, annotated))
    }

    /// Append the assistant reply for the pending send
    pub fn receive(&mut self, output: &ModelOutput) -> &ChatMessage {
        self.pending = false;
        let reply = ChatMessage::new(Speaker::Assistant, output.display_text())
            .with_failed(output.is_failure());
        self.transcript.push(reply);
        &self.transcript[self.transcript.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TurnRole;

    #[test]
    fn test_submit_replays_prior_messages_only() {
        let mut session = ChatSession::new();
        session.select_role(Speaker::Judge);

        let (history, message) = session.submit("Was the sample representative?").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, TurnRole::Model);
        assert_eq!(message, "[Role: Judge] Was the sample representative?");
        assert_eq!(session.transcript().len(), 2);
        assert!(session.is_pending());
    }

    #[test]
    fn test_send_rules() {
        let mut session = ChatSession::new();
        assert_eq!(session.submit("   ").unwrap_err(), ChatError::EmptyMessage);

        session.submit("first").unwrap();
        assert_eq!(session.submit("second").unwrap_err(), ChatError::Busy);

        let reply = session.receive(&ModelOutput::text("answer"));
        assert_eq!(reply.role, Speaker::Assistant);
        assert!(!reply.failed);
        assert!(session.submit("second").is_ok());
    }

    #[test]
    fn test_assistant_role_not_selectable() {
        let mut session = ChatSession::new();
        assert!(!session.select_role(Speaker::Assistant));
        assert_eq!(session.role(), Speaker::Plaintiff);
    }
}
