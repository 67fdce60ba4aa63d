//! lexsim - Mock court simulator
//!
//! Walks a litigation scenario through fixed procedural phases
//! (chronology, cross-examination, investigation, debate, closing
//! statements, free chat). All legal reasoning is delegated to a hosted
//! language model; this crate manages the case state around it.
//!
//! # Architecture
//!
//! State changes go through a single reducer:
//! - Every user action and model result is an `Action`
//! - `reduce` updates `AppState` and returns `Effect`s (model calls, notices)
//! - Generated content is cached per phase and tagged with the context
//!   epoch it was built from; results for an outdated context are dropped
//!
//! # Modules
//!
//! - `adapters`: Model gateway trait and the Gemini implementation
//! - `core`: Reducer, phase cache, chat session, and the `Court` controller
//! - `domain`: Data structures (phases, evidence, case context, chat)
//! - `cli`: Command-line interface and interactive session
//!
//! # Usage
//!
//! ```bash
//! # Interactive session on the demo case
//! GEMINI_API_KEY=... lexsim session
//!
//! # One-shot phase generation for a custom case
//! lexsim phase dispute_focus --case facts.txt
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{GatewayError, GeminiGateway, ModelGateway};
pub use core::{AppState, Court, Notice};
pub use domain::{
    CaseContext, ChatMessage, CourtPhase, EvidenceDraft, EvidenceItem, ModelOutput, Speaker,
};
