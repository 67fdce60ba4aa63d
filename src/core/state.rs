//! Application state of one simulator session.

use crate::domain::{demo_evidence, CaseContext, CourtPhase, EvidenceItem};

use super::chat::ChatSession;
use super::phase_cache::PhaseCache;

/// Everything the front-end renders; changed only through `reduce`
#[derive(Debug, Clone)]
pub struct AppState {
    /// Displayed phase
    pub active_phase: CourtPhase,

    /// Case facts fed to every prompt
    pub context: CaseContext,

    /// Evidence entered for the open case
    pub evidence: Vec<EvidenceItem>,

    /// Generated phase content
    pub phases: PhaseCache,

    /// Free chat transcript, independent of the open case
    pub chat: ChatSession,
}

impl Default for AppState {
    fn default() -> Self {
        Self::demo()
    }
}

impl AppState {
    /// Bootstrap state: demo case and demo evidence
    pub fn demo() -> Self {
        Self {
            active_phase: CourtPhase::FIRST,
            context: CaseContext::demo(),
            evidence: demo_evidence(),
            phases: PhaseCache::new(),
            chat: ChatSession::new(),
        }
    }

    /// State for a user-supplied case with no evidence yet
    pub fn with_case(context: CaseContext) -> Self {
        Self {
            context,
            evidence: Vec::new(),
            ..Self::demo()
        }
    }

    /// Replace the case wholesale and go back to the first phase
    pub(crate) fn replace_case(&mut self, context: CaseContext, evidence: Vec<EvidenceItem>) {
        self.context = context;
        self.evidence = evidence;
        self.phases.invalidate();
        self.active_phase = CourtPhase::FIRST;
    }

    /// Whether the displayed phase is waiting on the model
    pub fn is_generating(&self) -> bool {
        self.phases.is_generating(self.active_phase)
    }
}
