//! Single update function for all state transitions.
//!
//! `reduce` never performs I/O. Model calls come back as effects; the
//! caller runs them and feeds the results in as new actions.

use std::fmt;

use crate::adapters::ChatTurn;
use crate::domain::{demo_evidence, CaseContext, CourtPhase, EvidenceItem, ModelOutput, Speaker};

use super::phase_cache::{Admission, Completion};
use super::state::AppState;

/// User actions and model results
#[derive(Debug, Clone)]
pub enum Action {
    /// Show a phase, generating its content if missing
    Activate(CourtPhase),

    /// Drop a phase's content and generate it again
    Regenerate(CourtPhase),

    /// Append validated evidence
    AddEvidence(EvidenceItem),

    /// Start a new case from user-supplied facts
    OpenCase(CaseContext),

    /// Go back to the demo case
    ResetToDemo,

    /// A phase generation resolved
    GenerationFinished {
        phase: CourtPhase,
        epoch: u64,
        output: ModelOutput,
    },

    /// Change the chat speaking role
    SelectRole(Speaker),

    /// Send a chat message as the selected role
    SubmitChat(String),

    /// The pending chat send resolved
    ChatFinished(ModelOutput),
}

/// Work requested by a transition
#[derive(Debug, Clone)]
pub enum Effect {
    Generate(GenerationRequest),
    Chat(ChatRequest),
    Notify(Notice),
}

/// One phase generation, tagged with the epoch it was built from
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub phase: CourtPhase,
    pub epoch: u64,
    pub instruction: &'static str,
    pub context: String,
}

/// One chat send with the full replayed history
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub context: String,
}

/// Messages for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Cross-examination was opened with no evidence on file
    NoEvidenceLoaded,

    /// A result arrived after the case context changed and was dropped
    StaleResultDiscarded { phase: CourtPhase },

    /// A phase generation failed; the fallback text was cached
    GenerationFailed { phase: CourtPhase, reason: String },

    /// A chat send failed; the fallback reply was appended
    ChatFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoEvidenceLoaded => write!(
                f,
                "Note: You have no evidence loaded. Please add case materials or load a demo case."
            ),
            Notice::StaleResultDiscarded { phase } => write!(
                f,
                "The case changed while '{}' was generating; the result was discarded. Open the phase again to regenerate.",
                phase.label()
            ),
            Notice::GenerationFailed { phase, reason } => {
                write!(f, "Generation for '{}' failed: {}", phase.label(), reason)
            }
            Notice::ChatFailed { reason } => write!(f, "Chat reply failed: {}", reason),
        }
    }
}

/// Apply `action` to `state` and return the effects to run
pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::Activate(phase) => activate(state, phase),
        Action::Regenerate(phase) => {
            if phase.is_generated() {
                state.phases.evict(phase);
            }
            activate(state, phase)
        }
        Action::AddEvidence(item) => {
            state.context.append_evidence(&item);
            state.evidence.push(item);
            state.phases.invalidate();
            Vec::new()
        }
        Action::OpenCase(context) => {
            state.replace_case(context, Vec::new());
            Vec::new()
        }
        Action::ResetToDemo => {
            state.replace_case(CaseContext::demo(), demo_evidence());
            Vec::new()
        }
        Action::GenerationFinished {
            phase,
            epoch,
            output,
        } => finish_generation(state, phase, epoch, output),
        Action::SelectRole(role) => {
            state.chat.select_role(role);
            Vec::new()
        }
        Action::SubmitChat(content) => match state.chat.submit(&content) {
            Ok((history, message)) => vec![Effect::Chat(ChatRequest {
                history,
                message,
                context: state.context.to_string(),
            })],
            // Callers check `ChatSession::check_send` first
            Err(_) => Vec::new(),
        },
        Action::ChatFinished(output) => {
            state.chat.receive(&output);
            match output.failure_reason() {
                Some(reason) => vec![Effect::Notify(Notice::ChatFailed {
                    reason: reason.to_string(),
                })],
                None => Vec::new(),
            }
        }
    }
}

fn activate(state: &mut AppState, phase: CourtPhase) -> Vec<Effect> {
    state.active_phase = phase;

    let Some(instruction) = phase.instruction() else {
        return Vec::new();
    };

    let mut effects = Vec::new();
    match state.phases.begin(phase) {
        Admission::Cached => return effects,
        Admission::InFlight => {}
        Admission::Start { epoch } => effects.push(Effect::Generate(GenerationRequest {
            phase,
            epoch,
            instruction,
            context: state.context.to_string(),
        })),
    }

    if phase.needs_evidence() && state.evidence.is_empty() {
        effects.insert(0, Effect::Notify(Notice::NoEvidenceLoaded));
    }
    effects
}

fn finish_generation(
    state: &mut AppState,
    phase: CourtPhase,
    epoch: u64,
    output: ModelOutput,
) -> Vec<Effect> {
    let reason = output.failure_reason().map(str::to_string);

    match state.phases.complete(phase, epoch, output) {
        Completion::Stale { .. } => vec![Effect::Notify(Notice::StaleResultDiscarded { phase })],
        Completion::Stored => match reason {
            Some(reason) => vec![Effect::Notify(Notice::GenerationFailed { phase, reason })],
            None => Vec::new(),
        },
    }
}
