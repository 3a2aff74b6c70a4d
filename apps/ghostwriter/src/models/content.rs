use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QaPair {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub source_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: Uuid,
    pub body: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub content_format: Option<String>,
}

/// Outcome of the screening step for one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempt's persisted outcome. Append-only: never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub request_id: Uuid,
    pub draft: String,
    pub status: ApprovalStatus,
    /// Raw screening output, kept for audit.
    pub verdict: String,
}
