use super::model::{EnrollmentRequest, TransactionDetails};
use crate::service::storage_service::FilePayload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub amount: i64,
    pub method: String,
    #[serde(default)]
    pub transaction_details: TransactionDetails,
}

/// Result of a submission. A second submission for the same learner and course is not an
/// error: it hands back the record that already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(EnrollmentRequest),
    AlreadyExists(EnrollmentRequest),
}

impl SubmitOutcome {
    pub fn enrollment(&self) -> &EnrollmentRequest {
        match self {
            Self::Created(e) | Self::AlreadyExists(e) => e,
        }
    }

    pub fn into_enrollment(self) -> EnrollmentRequest {
        match self {
            Self::Created(e) | Self::AlreadyExists(e) => e,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEnrollmentRequest {
    #[serde(alias = "courseId")]
    pub course_id: String,
    #[serde(alias = "paymentAmount")]
    pub payment_amount: i64,
    #[serde(alias = "paymentMethod")]
    pub payment_method: String,
    #[serde(default, alias = "transactionDetails")]
    pub transaction_details: TransactionDetails,
    #[serde(alias = "paymentProof")]
    pub payment_proof: Option<FilePayload>,
    /// Accepted for compatibility and ignored; new requests always start as pending.
    pub status: Option<EnrollmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub accepted: bool,
    pub already_exists: bool,
    pub enrollment: Option<EnrollmentRequest>,
    pub error_code: Option<String>,
    pub reason: String,
}
