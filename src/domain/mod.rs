//! Domain types for the mock court.
//!
//! This module contains the core data structures:
//! - Phases: Procedural steps and their task instructions
//! - Evidence: User-entered case material
//! - Case: The context text and the demo case
//! - Chat: Transcript entries and speaking roles
//! - Output: Tagged model results

pub mod case;
pub mod chat;
pub mod evidence;
pub mod output;
pub mod phase;

// Re-export commonly used types
pub use case::{demo_evidence, CaseContext, CaseError, DEMO_CASE_CONTEXT};
pub use chat::{role_prefixed, ChatMessage, Speaker, UnknownRole};
pub use evidence::{EvidenceDraft, EvidenceError, EvidenceItem, EVIDENCE_TYPES};
pub use output::{
    ModelOutput, CHAT_FALLBACK, EMPTY_CHAT_FALLBACK, EMPTY_GENERATION_FALLBACK,
    GENERATION_FALLBACK,
};
pub use phase::{CourtPhase, UnknownPhase};
