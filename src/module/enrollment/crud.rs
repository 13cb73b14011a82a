use super::model::EnrollmentRequest;
use super::schema::{EnrollmentStatus, PaymentInfo, SubmitOutcome};
use crate::app::AppState;
use crate::error::{CoreError, CoreResult};
use crate::service::authz_service::{Actor, ensure_identified};
use crate::service::storage_service::FileUpload;
use crate::store::StoreError;
use tracing::{info, warn};
use uuid::Uuid;

pub const PAYMENT_PROOF_FOLDER: &str = "payment-proofs";

/// Accepts a learner's paid enrollment request.
///
/// Validation runs before any side effect: the proof is mandatory and the amount must equal the
/// course price exactly. A request for a `(user, course)` pair that already exists is returned as
/// `AlreadyExists`, both when found up front and when a concurrent submission wins the insert.
pub async fn submit(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    payment: PaymentInfo,
    proof: Option<FileUpload>,
) -> CoreResult<SubmitOutcome> {
    ensure_identified(actor)?;
    let Some(proof) = proof.filter(|p| !p.bytes.is_empty()) else {
        return Err(CoreError::Validation("payment proof file is required".to_string()));
    };
    let method = payment.method.trim().to_string();
    if method.is_empty() {
        return Err(CoreError::Validation("payment method is required".to_string()));
    }

    let course = state.store.get_course(course_id).await?;
    if payment.amount != course.price {
        return Err(CoreError::Validation(format!(
            "payment amount {} does not match course price {}",
            payment.amount, course.price
        )));
    }

    if let Some(existing) = state.store.find_enrollment(&actor.id, course_id).await? {
        info!(
            enrollment_id = %existing.id,
            status = existing.status.as_str(),
            "enrollment already exists; returning current record"
        );
        return Ok(SubmitOutcome::AlreadyExists(existing));
    }

    let payment_proof = state.blobs.upload(&proof, PAYMENT_PROOF_FOLDER).await?;
    let now = state.clock.now();
    let enrollment = EnrollmentRequest {
        id: format!("enr-{}", Uuid::now_v7().simple()),
        user_id: actor.id.clone(),
        course_id: course.id.clone(),
        status: EnrollmentStatus::Pending,
        payment_amount: payment.amount,
        payment_method: method,
        payment_proof,
        transaction_details: payment.transaction_details,
        payment_verified: false,
        reviewed_at: None,
        reviewed_by: None,
        rejection_reason: None,
        tracking_version: 0,
        created_at: now,
        updated_at: now,
    };

    match state.store.insert_enrollment(enrollment.clone()).await {
        Ok(created) => {
            info!(
                enrollment_id = %created.id,
                user_id = %created.user_id,
                course_id = %created.course_id,
                storage = created.payment_proof.storage_type.as_str(),
                "enrollment request submitted"
            );
            Ok(SubmitOutcome::Created(created))
        }
        Err(StoreError::Duplicate(_)) => {
            if !state.blobs.delete(&enrollment.payment_proof).await {
                warn!(id = %enrollment.payment_proof.id, "could not remove proof of losing submission");
            }
            let existing = state
                .store
                .find_enrollment(&actor.id, course_id)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict(format!(
                        "enrollment for course {course_id} collided but could not be read back"
                    ))
                })?;
            Ok(SubmitOutcome::AlreadyExists(existing))
        }
        Err(e) => {
            if !state.blobs.delete(&enrollment.payment_proof).await {
                warn!(id = %enrollment.payment_proof.id, "could not remove proof after failed insert");
            }
            Err(e.into())
        }
    }
}

/// Visible to the learner who submitted it and to admins.
pub async fn get_enrollment(
    state: &AppState,
    actor: &Actor,
    enrollment_id: &str,
) -> CoreResult<EnrollmentRequest> {
    ensure_identified(actor)?;
    let enrollment = state.store.get_enrollment(enrollment_id).await?;
    if !actor.is_admin() && actor.id != enrollment.user_id {
        return Err(CoreError::Forbidden(format!(
            "enrollment {enrollment_id} belongs to another user"
        )));
    }
    Ok(enrollment)
}
