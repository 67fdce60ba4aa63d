//! Procedural phases of the simulated hearing.
//!
//! Each phase except free chat maps to a fixed task instruction that is
//! sent to the model together with the case context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One step of the simulated court procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtPhase {
    /// Chronology of key events
    CaseChronology,

    /// Mutual cross-examination opinions on the evidence
    EvidenceAnalysis,

    /// Judge-led fact investigation
    CourtInvestigation,

    /// Counsel questioning each other
    CrossExamination,

    /// Contested issues of the case
    DisputeFocus,

    /// Plaintiff's debate opinion
    DebatePlaintiff,

    /// Defendant's debate opinion
    DebateDefendant,

    /// Plaintiff's closing statement
    ClosingPlaintiff,

    /// Defendant's closing statement
    ClosingDefendant,

    /// Free conversation with the assistant
    Chat,
}

impl CourtPhase {
    /// All phases in tab order
    pub const ALL: [CourtPhase; 10] = [
        CourtPhase::CaseChronology,
        CourtPhase::EvidenceAnalysis,
        CourtPhase::CourtInvestigation,
        CourtPhase::CrossExamination,
        CourtPhase::DisputeFocus,
        CourtPhase::DebatePlaintiff,
        CourtPhase::DebateDefendant,
        CourtPhase::ClosingPlaintiff,
        CourtPhase::ClosingDefendant,
        CourtPhase::Chat,
    ];

    /// The phase shown after bootstrap and after every case reset
    pub const FIRST: CourtPhase = CourtPhase::CaseChronology;

    /// Stable identifier
    pub fn id(self) -> &'static str {
        match self {
            CourtPhase::CaseChronology => "case_chronology",
            CourtPhase::EvidenceAnalysis => "evidence_analysis",
            CourtPhase::CourtInvestigation => "court_investigation",
            CourtPhase::CrossExamination => "cross_examination",
            CourtPhase::DisputeFocus => "dispute_focus",
            CourtPhase::DebatePlaintiff => "debate_plaintiff",
            CourtPhase::DebateDefendant => "debate_defendant",
            CourtPhase::ClosingPlaintiff => "closing_plaintiff",
            CourtPhase::ClosingDefendant => "closing_defendant",
            CourtPhase::Chat => "chat",
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            CourtPhase::CaseChronology => "Chronology (大事记)",
            CourtPhase::EvidenceAnalysis => "Cross-Examination (质证)",
            CourtPhase::CourtInvestigation => "Court Investigation (法庭调查)",
            CourtPhase::CrossExamination => "Questioning (发问)",
            CourtPhase::DisputeFocus => "Dispute Focus (争议焦点)",
            CourtPhase::DebatePlaintiff => "Plaintiff Defense (原告辩论)",
            CourtPhase::DebateDefendant => "Defendant Defense (被告辩论)",
            CourtPhase::ClosingPlaintiff => "Plaintiff Closing (原告陈词)",
            CourtPhase::ClosingDefendant => "Defendant Closing (被告陈词)",
            CourtPhase::Chat => "AI Assistant (案情对话)",
        }
    }

    /// Whether activating this phase produces generated content
    pub fn is_generated(self) -> bool {
        self != CourtPhase::Chat
    }

    /// Whether an empty evidence list should be flagged on activation
    pub fn needs_evidence(self) -> bool {
        self == CourtPhase::EvidenceAnalysis
    }

    /// Task instruction sent to the model, `None` for free chat
    pub fn instruction(self) -> Option<&'static str> {
        let text = match self {
            CourtPhase::CaseChronology => {
                "Analyze the provided case context and evidence to create a comprehensive \
                 Case Chronology (案件大事记). List all key events strictly in chronological \
                 order (Date - Event). Include details about the contract signing, production, \
                 shipment, customs seizure, testing reports, and subsequent communications/notices."
            }
            CourtPhase::EvidenceAnalysis => {
                "Create two sections: 1) Plaintiff's cross-examination opinion on Defendant's \
                 evidence. 2) Defendant's cross-examination opinion on Plaintiff's evidence."
            }
            CourtPhase::CourtInvestigation => {
                "Simulate the Court Investigation phase. List 3-5 sharp questions from the Judge \
                 regarding the facts, defects, and mitigation. Provide answers for both Plaintiff \
                 and Defendant."
            }
            CourtPhase::CrossExamination => {
                "Simulate the mutual questioning phase. 1) Plaintiff lawyer asks Defendant \
                 questions. 2) Defendant lawyer asks Plaintiff questions."
            }
            CourtPhase::DisputeFocus => {
                "Summarize the Controversial Focus (争议焦点) of this case based on the evidence \
                 and arguments."
            }
            CourtPhase::DebatePlaintiff => {
                "Draft the Plaintiff's debate opinion. Argue for full compensation based on \
                 contract breach and damages."
            }
            CourtPhase::DebateDefendant => {
                "Draft the Defendant's debate opinion. Argue for mitigation of damages, minor \
                 defects, or lack of proof for losses."
            }
            CourtPhase::ClosingPlaintiff => "Draft a powerful Closing Statement for the Plaintiff.",
            CourtPhase::ClosingDefendant => "Draft a Closing Statement for the Defendant.",
            CourtPhase::Chat => return None,
        };
        Some(text)
    }

    /// Look up a phase by id or by its 1-based tab position
    pub fn parse_selector(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if let Ok(position) = selector.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|idx| Self::ALL.get(idx).copied());
        }
        selector.parse().ok()
    }
}

impl Default for CourtPhase {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for CourtPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CourtPhase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|phase| phase.id() == wanted)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// Phase identifier that matches no known phase
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown phase: {0}")]
pub struct UnknownPhase(pub String);
