//! Case context and the built-in demo case.
//!
//! The context is the accumulated case-fact text supplied to every model
//! request. It is never empty and only grows while a case is open.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::evidence::EvidenceItem;

/// Accumulated case facts fed to every prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseContext(String);

impl CaseContext {
    /// Create a context, rejecting blank text
    pub fn new(text: impl Into<String>) -> Result<Self, CaseError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CaseError::EmptyContext);
        }
        Ok(Self(text))
    }

    /// The built-in demo case
    pub fn demo() -> Self {
        Self(DEMO_CASE_CONTEXT.to_string())
    }

    /// Append the block describing a newly added evidence item
    pub fn append_evidence(&mut self, item: &EvidenceItem) {
        self.0.push_str(&item.context_block());
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CaseContext {
    fn default() -> Self {
        Self::demo()
    }
}

impl fmt::Display for CaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CaseContext {
    type Error = CaseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl From<CaseContext> for String {
    fn from(context: CaseContext) -> Self {
        context.0
    }
}

impl AsRef<str> for CaseContext {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors opening a case
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    #[error("Case context is empty")]
    EmptyContext,
}

/// Evidence list shipped with the demo case
pub fn demo_evidence() -> Vec<EvidenceItem> {
    DEMO_EVIDENCE
        .iter()
        .map(|(id, name, kind, summary)| EvidenceItem {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            summary: summary.to_string(),
        })
        .collect()
}

const DEMO_EVIDENCE: [(&str, &str, &str, &str); 6] = [
    (
        "1",
        "Civil Complaint.pdf",
        "Legal",
        "Plaintiff claims 208k RMB damages due to defective glue guns seized in UK.",
    ),
    (
        "2",
        "PO2403210004.pdf",
        "Contract",
        "Purchase order for 2000 units of RJ805 Glue Gun.",
    ),
    (
        "3",
        "Test Report CI10773c.pdf",
        "Technical",
        "Cass Industries report: FAIL. Fuse link non-compliant with BS1362.",
    ),
    (
        "4",
        "TS Emails.pdf",
        "Communication",
        "Thurrock Council notifying goods must be destroyed due to safety issues.",
    ),
    (
        "5",
        "Destruction Cert.pdf",
        "Legal",
        "Certificate WE00294 confirming destruction of 4 pallets.",
    ),
    (
        "6",
        "Civil Defense.pdf",
        "Legal",
        "Defendant argues failure to mitigate losses and disputes profit loss calculation.",
    ),
];

/// Synthesized facts of the demo dispute
pub const DEMO_CASE_CONTEXT: &str = r#"
CASE BACKGROUND:
This is a civil contract dispute case (Case No. 2025 Yue 0307 Min Chu 63735) between:
Plaintiff: Shenzhen Tilswall Innovation Technology Co., Ltd. (Buyer/Cross-border Seller)
Defendant: Dongguan Ruijiang Intelligent Technology Co., Ltd. (Manufacturer/Supplier)

FACTS:
1. On March 23, 2024, Plaintiff ordered 2000 units of UK-spec Hot Glue Guns (Model RJ805) from Defendant (PO2403210004). Total value: 42,871 RMB.
2. Defendant delivered goods on April 16, 2024.
3. Plaintiff shipped goods to Amazon UK via logistics provider.
4. In July 2024, UK Trading Standards (Thurrock Council) seized the goods (Container CMAU6778107).
5. Testing by Cass Industries Ltd (Report CI10773c_LVD) found:
   - Mains plug fuse did not conform to BS 1362 (weight 1.5g vs expected >2.1g, dimensions incorrect, no sand filler).
   - Labeling issues (warnings not at start of manual).
   - Failed Safety Regulations 2016.
6. Goods were refused entry and ordered destroyed. Destruction Certificate WE00294 issued on 26/11/2024.
7. Plaintiff claims total loss: 208,387.61 RMB (Goods value, logistics, destruction costs, profit loss).

PLAINTIFF'S ARGUMENT:
- Defendant delivered defective goods (non-compliant fuse) causing seizure and destruction.
- Fundamental breach of contract.
- Demands compensation for all direct and indirect losses.

DEFENDANT'S DEFENSE (from Civil Reply):
- The UK report was a "sampling check" of 1 unit; implies not all were defective.
- The defect (fuse) is a minor accessory issue, not a whole product failure.
- Plaintiff failed to mitigate losses (did not arrange return/repair, just destruction).
- Disputes the calculation of logistics and profit losses as unproven or excessive.
- Defendant claims the fuse supplier provided certificates, suggesting they were misled or it was a batch issue.

EVIDENCE LIST:
1. Purchase Order PO2403210004.
2. Commercial Invoices & Logistics Invoices (Amazon Global Logistics).
3. UK Trading Standards Emails (Olga Saninoiu) confirming seizure and destruction order.
4. Cass Industries Test Report (Failed).
5. Certificate of Destruction.
6. Chat logs (WeChat) showing communication about the issue.
7. Defendant's "Civil Reply" document.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evidence::EvidenceDraft;

    #[test]
    fn test_blank_context_rejected() {
        assert_eq!(CaseContext::new(" \n\t"), Err(CaseError::EmptyContext));
        assert!(CaseContext::new("Facts.").is_ok());
    }

    #[test]
    fn test_deserialize_enforces_non_empty() {
        let context: CaseContext = serde_json::from_str(r#""Facts.""#).unwrap();
        assert_eq!(context.as_str(), "Facts.");
        assert!(serde_json::from_str::<CaseContext>(r#""  ""#).is_err());
        assert_eq!(serde_json::to_string(&context).unwrap(), r#""Facts.""#);
    }

    #[test]
    fn test_append_keeps_prefix() {
        let mut context = CaseContext::new("Facts.").unwrap();
        let item = EvidenceDraft::new("Email.eml", "Seller admits defect.")
            .with_kind("Communication")
            .validate()
            .unwrap();
        context.append_evidence(&item);

        assert!(context.as_str().starts_with("Facts.\n\n[NEW EVIDENCE ADDED]"));
        assert!(context.as_str().ends_with("Content/Summary: Seller admits defect."));
    }

    #[test]
    fn test_demo_case() {
        let evidence = demo_evidence();
        assert_eq!(evidence.len(), 6);
        assert_eq!(evidence[0].id, "1");
        assert!(CaseContext::demo().as_str().contains("CASE BACKGROUND"));
    }
}
