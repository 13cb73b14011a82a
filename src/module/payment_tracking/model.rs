use super::schema::{PaymentStatus, RejectionReason};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const RETRY_COOLDOWN_SECONDS: i64 = 24 * 60 * 60;

/// Retry/cooldown shadow of one enrollment request.
///
/// `version` increases by one on every persisted transition and is the equality precondition
/// for the next write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusTracking {
    pub id: String,
    pub enrollment_id: String,
    pub user_id: String,
    pub course_id: String,
    pub status: PaymentStatus,
    pub rejection_reason: Option<RejectionReason>,
    pub rejection_notes: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub can_retry: bool,
    pub next_retry_after: Option<i64>,
    pub last_retry_at: Option<i64>,
    pub approved_at: Option<i64>,
    pub approved_by: Option<String>,
    pub rejected_at: Option<i64>,
    pub rejected_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: i64,
}

impl PaymentStatusTracking {
    pub fn is_terminal(&self) -> bool {
        match self.status {
            PaymentStatus::Approved | PaymentStatus::Refunded => true,
            PaymentStatus::Rejected => !self.can_retry || self.retry_count >= self.max_retries,
            PaymentStatus::Pending => false,
        }
    }
}
