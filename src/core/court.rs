//! Phase controller driving the simulator.
//!
//! Coordinates state transitions, model calls, and result delivery. State
//! lives behind a lock that is never held across a model call, so the
//! evidence list stays editable while a phase is generating.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{error, info, instrument, warn};

use crate::adapters::{GatewayError, ModelGateway};
use crate::domain::{
    CaseContext, CaseError, ChatMessage, CourtPhase, EvidenceDraft, EvidenceError, EvidenceItem,
    ModelOutput, Speaker, CHAT_FALLBACK, EMPTY_CHAT_FALLBACK, EMPTY_GENERATION_FALLBACK,
    GENERATION_FALLBACK,
};

use super::chat::ChatError;
use super::reducer::{reduce, Action, ChatRequest, Effect, GenerationRequest, Notice};
use super::state::AppState;

/// Mock court session bound to a model gateway
#[derive(Clone)]
pub struct Court {
    state: Arc<Mutex<AppState>>,
    gateway: Arc<dyn ModelGateway>,
}

impl Court {
    /// Create a session on the demo case
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_state(gateway, AppState::demo())
    }

    /// Create a session from an existing state
    pub fn with_state(gateway: Arc<dyn ModelGateway>, state: AppState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            gateway,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        // No transition panics midway, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one action and return the effects it requests
    pub fn dispatch(&self, action: Action) -> Vec<Effect> {
        reduce(&mut self.lock(), action)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    /// Cached output of a phase
    pub fn phase_output(&self, phase: CourtPhase) -> Option<ModelOutput> {
        self.lock().phases.get(phase).cloned()
    }

    /// Gateway this session talks to
    pub fn gateway(&self) -> &dyn ModelGateway {
        self.gateway.as_ref()
    }

    /// Show a phase, generating its content once per context epoch
    #[instrument(skip(self), fields(phase = %phase))]
    pub async fn activate(&self, phase: CourtPhase) -> Vec<Notice> {
        let effects = self.dispatch(Action::Activate(phase));
        self.run_effects(effects).await
    }

    /// Discard a phase's content and generate it again
    #[instrument(skip(self), fields(phase = %phase))]
    pub async fn regenerate(&self, phase: CourtPhase) -> Vec<Notice> {
        let effects = self.dispatch(Action::Regenerate(phase));
        self.run_effects(effects).await
    }

    /// Validate and append evidence; clears all generated content
    pub fn add_evidence(&self, draft: EvidenceDraft) -> Result<EvidenceItem, EvidenceError> {
        let item = draft.validate()?;
        info!(evidence_id = %item.id, kind = %item.kind, "Evidence added, phase cache cleared");
        self.dispatch(Action::AddEvidence(item.clone()));
        Ok(item)
    }

    /// Start a new case from user-supplied facts
    pub fn open_case(&self, text: impl Into<String>) -> Result<(), CaseError> {
        let context = CaseContext::new(text)?;
        info!(context_digest = %context_digest(context.as_str()), "New case opened");
        self.dispatch(Action::OpenCase(context));
        Ok(())
    }

    /// Restore the demo case and its evidence
    pub fn reset(&self) {
        info!("Reset to demo case");
        self.dispatch(Action::ResetToDemo);
    }

    /// Change the chat speaking role
    pub fn select_role(&self, role: Speaker) {
        self.dispatch(Action::SelectRole(role));
    }

    /// Send a chat message as the selected role and return the reply
    #[instrument(skip(self, message))]
    pub async fn send_chat(&self, message: &str) -> Result<ChatMessage, ChatError> {
        let effects = {
            let mut state = self.lock();
            state.chat.check_send(message)?;
            reduce(&mut state, Action::SubmitChat(message.to_string()))
        };
        self.run_effects(effects).await;

        self.lock()
            .chat
            .transcript()
            .last()
            .filter(|m| m.role.is_assistant())
            .cloned()
            .ok_or(ChatError::Busy)
    }

    /// Run effects until none are left, collecting notices.
    ///
    /// Pair with `dispatch` to apply an action now and run its model calls
    /// elsewhere, e.g. on a spawned task.
    pub async fn run_effects(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut notices = Vec::new();

        while let Some(effect) = queue.pop_front() {
            let follow_up = match effect {
                Effect::Notify(notice) => {
                    notices.push(notice);
                    continue;
                }
                Effect::Generate(request) => self.generate(request).await,
                Effect::Chat(request) => self.chat(request).await,
            };
            queue.extend(self.dispatch(follow_up));
        }

        notices
    }

    async fn generate(&self, request: GenerationRequest) -> Action {
        let started = Instant::now();
        info!(
            phase = %request.phase,
            epoch = request.epoch,
            context_digest = %context_digest(&request.context),
            model = self.gateway.model(),
            "Generating phase content"
        );

        let result = self
            .gateway
            .generate(request.instruction, &request.context)
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        if let Err(ref e) = result {
            error!(phase = %request.phase, duration_ms, error = %e, "Generation failed");
        }
        let output = generation_output(result);

        let current_epoch = self.lock().phases.epoch();
        if current_epoch != request.epoch {
            warn!(
                phase = %request.phase,
                request_epoch = request.epoch,
                current_epoch,
                "Context changed during generation, discarding result"
            );
        } else {
            info!(phase = %request.phase, duration_ms, "Phase content ready");
        }

        Action::GenerationFinished {
            phase: request.phase,
            epoch: request.epoch,
            output,
        }
    }

    async fn chat(&self, request: ChatRequest) -> Action {
        let started = Instant::now();
        info!(turns = request.history.len(), "Sending chat message");

        let result = self
            .gateway
            .chat(&request.history, &request.message, &request.context)
            .await;

        if let Err(ref e) = result {
            error!(error = %e, "Chat failed");
        } else {
            info!(duration_ms = started.elapsed().as_millis() as u64, "Chat reply received");
        }

        Action::ChatFinished(chat_output(result))
    }
}

/// Tag a generation result, collapsing errors to the fallback text
pub fn generation_output(result: Result<String, GatewayError>) -> ModelOutput {
    match result {
        Ok(text) if !text.trim().is_empty() => ModelOutput::text(text),
        Ok(_) | Err(GatewayError::EmptyResponse) => ModelOutput::failed(
            EMPTY_GENERATION_FALLBACK,
            GatewayError::EmptyResponse.to_string(),
        ),
        Err(e) => ModelOutput::failed(GENERATION_FALLBACK, e.to_string()),
    }
}

/// Tag a chat result, collapsing errors to the apology text
pub fn chat_output(result: Result<String, GatewayError>) -> ModelOutput {
    match result {
        Ok(text) if !text.trim().is_empty() => ModelOutput::text(text),
        Ok(_) | Err(GatewayError::EmptyResponse) => ModelOutput::failed(
            EMPTY_CHAT_FALLBACK,
            GatewayError::EmptyResponse.to_string(),
        ),
        Err(e) => ModelOutput::failed(CHAT_FALLBACK, e.to_string()),
    }
}

/// Short fingerprint of the context for logs (first 16 hex chars of SHA-256)
pub fn context_digest(context: &str) -> String {
    let digest = Sha256::digest(context.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_output_tags_failures() {
        assert_eq!(
            generation_output(Ok("# Chronology".to_string())),
            ModelOutput::text("# Chronology")
        );

        let missing_key = generation_output(Err(GatewayError::MissingApiKey));
        assert_eq!(missing_key.display_text(), GENERATION_FALLBACK);
        assert!(missing_key.failure_reason().unwrap().contains("API key"));

        let blank = generation_output(Ok("  \n".to_string()));
        assert_eq!(blank.display_text(), EMPTY_GENERATION_FALLBACK);
    }

    #[test]
    fn test_chat_output_fallbacks() {
        let failed = chat_output(Err(GatewayError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }));
        assert_eq!(failed.display_text(), CHAT_FALLBACK);
        assert!(failed.failure_reason().unwrap().contains("503"));

        assert_eq!(
            chat_output(Err(GatewayError::EmptyResponse)).display_text(),
            EMPTY_CHAT_FALLBACK
        );
    }

    #[test]
    fn test_context_digest_is_stable() {
        let digest = context_digest("FACTS");
        assert_eq!(digest.len(), 16);
        assert_eq!(digest, context_digest("FACTS"));
        assert_ne!(digest, context_digest("FACTS."));
    }
}
