//! Evidence records entered by the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Category preselected in the evidence form
pub const DEFAULT_EVIDENCE_TYPE: &str = "Legal";

/// Suggested evidence categories; any other free-text type is accepted
pub const EVIDENCE_TYPES: [&str; 9] = [
    "Legal",
    "Contract",
    "Witness Statement",
    "Expert Report",
    "Evidence",
    "Technical",
    "Financial",
    "Communication",
    "Other",
];

/// A piece of case material summarized by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Client-generated identifier
    pub id: String,

    /// Document name, e.g. "Witness Statement.pdf"
    pub name: String,

    /// Free-text category
    #[serde(rename = "type")]
    pub kind: String,

    /// Summary of the content
    pub summary: String,
}

impl EvidenceItem {
    /// Block appended to the case context when this item is added
    pub fn context_block(&self) -> String {
        format!(
            "\n\n[NEW EVIDENCE ADDED]\nType: {}\nName: {}\nContent/Summary: {}",
            self.kind, self.name, self.summary
        )
    }
}

/// Unvalidated evidence as typed into the form
#[derive(Debug, Clone, Default)]
pub struct EvidenceDraft {
    pub name: String,
    pub kind: String,
    pub summary: String,
}

impl EvidenceDraft {
    /// Create a draft with the default category
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DEFAULT_EVIDENCE_TYPE.to_string(),
            summary: summary.into(),
        }
    }

    /// Set the category
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Check required fields and assign a fresh time-based id
    pub fn validate(self) -> Result<EvidenceItem, EvidenceError> {
        let missing_name = self.name.trim().is_empty();
        let missing_summary = self.summary.trim().is_empty();
        if missing_name || missing_summary {
            return Err(EvidenceError::MissingFields {
                name: missing_name,
                summary: missing_summary,
            });
        }

        let kind = if self.kind.trim().is_empty() {
            DEFAULT_EVIDENCE_TYPE.to_string()
        } else {
            self.kind
        };

        Ok(EvidenceItem {
            id: Uuid::now_v7().to_string(),
            name: self.name,
            kind,
            summary: self.summary,
        })
    }
}

/// Rejected evidence submissions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvidenceError {
    #[error("Evidence is missing required fields: {}", missing_fields(.name, .summary))]
    MissingFields { name: bool, summary: bool },
}

fn missing_fields(name: &bool, summary: &bool) -> String {
    let mut fields = Vec::new();
    if *name {
        fields.push("name");
    }
    if *summary {
        fields.push("summary");
    }
    fields.join(", ")
}
