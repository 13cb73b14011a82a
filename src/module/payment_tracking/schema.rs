use super::model::PaymentStatusTracking;
use crate::module::enrollment::model::EnrollmentRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InsufficientFunds,
    CardDeclined,
    ExpiredCard,
    IncorrectDetails,
    FraudDetected,
    DuplicateTransaction,
    BankError,
    Other,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientFunds => "insufficient_funds",
            Self::CardDeclined => "card_declined",
            Self::ExpiredCard => "expired_card",
            Self::IncorrectDetails => "incorrect_details",
            Self::FraudDetected => "fraud_detected",
            Self::DuplicateTransaction => "duplicate_transaction",
            Self::BankError => "bank_error",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectPaymentRequest {
    pub reason: RejectionReason,
    pub notes: Option<String>,
}

/// Tracker plus the mirrored enrollment after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub tracking: PaymentStatusTracking,
    pub enrollment: EnrollmentRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub ok: bool,
    pub tracking: Option<PaymentStatusTracking>,
    pub enrollment: Option<EnrollmentRequest>,
    pub error_code: Option<String>,
    pub reason: String,
}
