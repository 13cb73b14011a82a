use super::schema::EnrollmentStatus;
use crate::service::storage_service::UploadDescriptor;
use serde::{Deserialize, Serialize};

/// Sender-side details as typed by the learner. All optional and free-form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub sender_name: Option<String>,
    pub sender_account: Option<String>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

/// A learner's paid enrollment request. Unique per `(user_id, course_id)`; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub status: EnrollmentStatus,
    pub payment_amount: i64,
    pub payment_method: String,
    pub payment_proof: UploadDescriptor,
    #[serde(default)]
    pub transaction_details: TransactionDetails,
    #[serde(default)]
    pub payment_verified: bool,
    pub reviewed_at: Option<i64>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
    /// Version of the payment tracker whose state this record last mirrored.
    #[serde(default)]
    pub tracking_version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
