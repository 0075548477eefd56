use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::AccountId;

/// Upper bound on documents per submission.
pub const MAX_DOCUMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    #[serde(rename = "none")]
    NotSubmitted,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::NotSubmitted => "none",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Administrator verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationVerdict {
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub status: VerificationStatus,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decided_by: Option<AccountId>,
}

impl VerificationRequest {
    /// Replace the document set and queue for review. Allowed from any status, including
    /// Verified: re-submitting sends the profile back through review.
    pub fn submit_documents(
        &mut self,
        urls: Vec<String>,
        max_documents: usize,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        if urls.is_empty() {
            return Err(VerificationError::NoDocuments);
        }
        if urls.len() > max_documents {
            return Err(VerificationError::TooManyDocuments {
                count: urls.len(),
                max: max_documents,
            });
        }
        if urls.iter().any(|url| url.trim().is_empty()) {
            return Err(VerificationError::BlankDocument);
        }

        self.documents = urls.into_iter().map(|url| url.trim().to_string()).collect();
        self.status = VerificationStatus::Pending;
        self.submitted_at = Some(now);
        self.decided_at = None;
        self.decided_by = None;
        Ok(())
    }

    pub fn decide(
        &mut self,
        verdict: VerificationVerdict,
        admin: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        if self.status != VerificationStatus::Pending {
            return Err(VerificationError::NotPending {
                status: self.status,
            });
        }

        self.status = match verdict {
            VerificationVerdict::Verified => VerificationStatus::Verified,
            VerificationVerdict::Rejected => VerificationStatus::Rejected,
        };
        self.decided_at = Some(now);
        self.decided_by = Some(admin.clone());
        Ok(())
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("at least one document is required")]
    NoDocuments,
    #[error("{count} documents submitted; at most {max} are accepted")]
    TooManyDocuments { count: usize, max: usize },
    #[error("document references must not be blank")]
    BlankDocument,
    #[error("verification is {}, not pending", .status.label())]
    NotPending { status: VerificationStatus },
}
