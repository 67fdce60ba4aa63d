//! Core simulator logic.
//!
//! This module contains:
//! - PhaseCache: Generated content per phase, scoped to a context epoch
//! - ChatSession: Role-tagged chat transcript
//! - AppState / reduce: Explicit state and its single update function
//! - Court: Phase controller running model calls for the reducer

pub mod chat;
pub mod court;
pub mod phase_cache;
pub mod reducer;
pub mod state;

// Re-export commonly used types
pub use chat::{ChatError, ChatSession};
pub use court::{chat_output, context_digest, generation_output, Court};
pub use phase_cache::{Admission, Completion, PhaseCache};
pub use reducer::{reduce, Action, ChatRequest, Effect, GenerationRequest, Notice};
pub use state::AppState;
