use super::model::PaymentStatusTracking;
use super::schema::{PaymentStatus, RejectionReason, TransitionOutcome};
use crate::app::AppState;
use crate::error::{CoreError, CoreResult};
use crate::module::enrollment::model::EnrollmentRequest;
use crate::module::enrollment::schema::EnrollmentStatus;
use crate::service::authz_service::{Actor, ensure_admin, ensure_identified};
use crate::service::metrics_service;
use crate::store::StoreError;
use tracing::{error, info};
use uuid::Uuid;

/// Returns the tracker for an enrollment, creating it on first use.
///
/// A tracker created for an enrollment that was already reviewed starts in the mirrored state.
/// Concurrent creators race on the unique enrollment index; the loser re-reads the winner.
pub async fn ensure_tracking(
    state: &AppState,
    enrollment: &EnrollmentRequest,
) -> CoreResult<PaymentStatusTracking> {
    if let Some(existing) = state.store.find_tracking_by_enrollment(&enrollment.id).await? {
        return Ok(existing);
    }

    let now = state.clock.now();
    let reviewed_at = enrollment.reviewed_at;
    let reviewed_by = enrollment.reviewed_by.clone();
    let mut tracking = PaymentStatusTracking {
        id: format!("pay-{}", Uuid::now_v7().simple()),
        enrollment_id: enrollment.id.clone(),
        user_id: enrollment.user_id.clone(),
        course_id: enrollment.course_id.clone(),
        status: PaymentStatus::Pending,
        rejection_reason: None,
        rejection_notes: None,
        retry_count: 0,
        max_retries: state.payment_policy.max_retries,
        can_retry: true,
        next_retry_after: None,
        last_retry_at: None,
        approved_at: None,
        approved_by: None,
        rejected_at: None,
        rejected_by: None,
        created_at: now,
        updated_at: now,
        version: 0,
    };
    match enrollment.status {
        EnrollmentStatus::Pending => {}
        EnrollmentStatus::Approved => {
            tracking.status = PaymentStatus::Approved;
            tracking.can_retry = false;
            tracking.approved_at = reviewed_at;
            tracking.approved_by = reviewed_by;
        }
        EnrollmentStatus::Rejected => {
            tracking.status = PaymentStatus::Rejected;
            tracking.rejected_at = reviewed_at;
            tracking.rejected_by = reviewed_by;
            tracking.rejection_notes = enrollment.rejection_reason.clone();
            tracking.next_retry_after =
                Some(reviewed_at.unwrap_or(now) + state.payment_policy.retry_cooldown_seconds);
        }
    }

    match state.store.insert_tracking(tracking).await {
        Ok(created) => {
            info!(
                tracking_id = %created.id,
                enrollment_id = %created.enrollment_id,
                status = created.status.as_str(),
                "payment tracking created"
            );
            Ok(created)
        }
        Err(StoreError::Duplicate(_)) => state
            .store
            .find_tracking_by_enrollment(&enrollment.id)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict(format!(
                    "payment tracking for enrollment {} collided but could not be read back",
                    enrollment.id
                ))
            }),
        Err(e) => Err(e.into()),
    }
}

pub async fn approve(
    state: &AppState,
    actor: &Actor,
    tracking_id: &str,
) -> CoreResult<TransitionOutcome> {
    ensure_admin(actor)?;
    let current = state.store.get_tracking(tracking_id).await?;
    ensure_pending(&current, "approved")?;

    let now = state.clock.now();
    let mut next = current.clone();
    next.status = PaymentStatus::Approved;
    next.approved_at = Some(now);
    next.approved_by = Some(actor.id.clone());
    next.can_retry = false;
    next.next_retry_after = None;
    let tracking = commit(state, &current, next).await?;

    let enrollment = mirror_enrollment(state, &tracking, |enrollment| {
        enrollment.status = EnrollmentStatus::Approved;
        enrollment.payment_verified = true;
        enrollment.reviewed_at = Some(now);
        enrollment.reviewed_by = Some(actor.id.clone());
        enrollment.rejection_reason = None;
    })
    .await?;

    info!(
        tracking_id = %tracking.id,
        enrollment_id = %tracking.enrollment_id,
        approved_by = %actor.id,
        "payment approved"
    );
    Ok(TransitionOutcome {
        tracking,
        enrollment,
    })
}

pub async fn reject(
    state: &AppState,
    actor: &Actor,
    tracking_id: &str,
    reason: RejectionReason,
    notes: Option<String>,
) -> CoreResult<TransitionOutcome> {
    ensure_admin(actor)?;
    let current = state.store.get_tracking(tracking_id).await?;
    ensure_pending(&current, "rejected")?;

    let now = state.clock.now();
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let mut next = current.clone();
    next.status = PaymentStatus::Rejected;
    next.rejection_reason = Some(reason);
    next.rejection_notes = notes.clone();
    next.rejected_at = Some(now);
    next.rejected_by = Some(actor.id.clone());
    next.next_retry_after = Some(now + state.payment_policy.retry_cooldown_seconds);
    let tracking = commit(state, &current, next).await?;

    let summary = match &notes {
        Some(notes) => format!("{}: {notes}", reason.as_str()),
        None => reason.as_str().to_string(),
    };
    let enrollment = mirror_enrollment(state, &tracking, |enrollment| {
        enrollment.status = EnrollmentStatus::Rejected;
        enrollment.payment_verified = false;
        enrollment.reviewed_at = Some(now);
        enrollment.reviewed_by = Some(actor.id.clone());
        enrollment.rejection_reason = Some(summary);
    })
    .await?;

    info!(
        tracking_id = %tracking.id,
        enrollment_id = %tracking.enrollment_id,
        rejected_by = %actor.id,
        reason = reason.as_str(),
        next_retry_after = ?tracking.next_retry_after,
        "payment rejected"
    );
    Ok(TransitionOutcome {
        tracking,
        enrollment,
    })
}

/// Learner-initiated retry of a rejected payment.
///
/// Guards run in a fixed order and a failing guard never mutates state: owner check, retry
/// permission, retry budget, cooldown. A successful retry restarts the cooldown so a fresh
/// rejection is not needed to rate-limit the next attempt.
pub async fn request_retry(
    state: &AppState,
    actor: &Actor,
    tracking_id: &str,
) -> CoreResult<TransitionOutcome> {
    ensure_identified(actor)?;
    let current = state.store.get_tracking(tracking_id).await?;
    let now = state.clock.now();
    check_retry_allowed(&current, &actor.id, now)?;

    let mut next = current.clone();
    next.status = PaymentStatus::Pending;
    next.retry_count = current.retry_count + 1;
    next.last_retry_at = Some(now);
    next.rejection_reason = None;
    next.rejection_notes = None;
    next.rejected_at = None;
    next.rejected_by = None;
    next.next_retry_after = Some(now + state.payment_policy.retry_cooldown_seconds);
    let tracking = commit(state, &current, next).await?;

    let enrollment = mirror_enrollment(state, &tracking, |enrollment| {
        enrollment.status = EnrollmentStatus::Pending;
        enrollment.payment_verified = false;
        enrollment.reviewed_at = None;
        enrollment.reviewed_by = None;
        enrollment.rejection_reason = None;
    })
    .await?;

    metrics_service::inc_payment_retries_requested();
    info!(
        tracking_id = %tracking.id,
        user_id = %actor.id,
        retry_count = tracking.retry_count,
        max_retries = tracking.max_retries,
        "payment retry requested"
    );
    Ok(TransitionOutcome {
        tracking,
        enrollment,
    })
}

pub fn check_retry_allowed(
    tracking: &PaymentStatusTracking,
    requester_id: &str,
    now: i64,
) -> CoreResult<()> {
    if requester_id != tracking.user_id {
        return Err(CoreError::Forbidden(
            "only the learner who submitted the payment may retry it".to_string(),
        ));
    }
    if !tracking.can_retry {
        return Err(CoreError::RetryNotAllowed);
    }
    if tracking.retry_count >= tracking.max_retries {
        return Err(CoreError::RetryLimitExceeded {
            retry_count: tracking.retry_count,
            max_retries: tracking.max_retries,
        });
    }
    if let Some(next_retry_after) = tracking.next_retry_after {
        if now < next_retry_after {
            return Err(CoreError::RetryTooSoon { next_retry_after });
        }
    }
    // Only a rejected payment has anything to retry.
    if tracking.status != PaymentStatus::Rejected {
        return Err(CoreError::RetryNotAllowed);
    }
    Ok(())
}

pub async fn approve_enrollment(
    state: &AppState,
    actor: &Actor,
    enrollment_id: &str,
) -> CoreResult<TransitionOutcome> {
    ensure_admin(actor)?;
    let enrollment = state.store.get_enrollment(enrollment_id).await?;
    let tracking = ensure_tracking(state, &enrollment).await?;
    approve(state, actor, &tracking.id).await
}

pub async fn reject_enrollment(
    state: &AppState,
    actor: &Actor,
    enrollment_id: &str,
    reason: RejectionReason,
    notes: Option<String>,
) -> CoreResult<TransitionOutcome> {
    ensure_admin(actor)?;
    let enrollment = state.store.get_enrollment(enrollment_id).await?;
    let tracking = ensure_tracking(state, &enrollment).await?;
    reject(state, actor, &tracking.id, reason, notes).await
}

pub async fn get_tracking(
    state: &AppState,
    actor: &Actor,
    tracking_id: &str,
) -> CoreResult<TransitionOutcome> {
    ensure_identified(actor)?;
    let tracking = state.store.get_tracking(tracking_id).await?;
    ensure_can_view(actor, &tracking)?;
    let enrollment = state.store.get_enrollment(&tracking.enrollment_id).await?;
    Ok(TransitionOutcome {
        tracking,
        enrollment,
    })
}

pub async fn get_tracking_for_enrollment(
    state: &AppState,
    actor: &Actor,
    enrollment_id: &str,
) -> CoreResult<TransitionOutcome> {
    ensure_identified(actor)?;
    let tracking = state
        .store
        .find_tracking_by_enrollment(enrollment_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound(format!("payment tracking for enrollment {enrollment_id}"))
        })?;
    ensure_can_view(actor, &tracking)?;
    let enrollment = state.store.get_enrollment(enrollment_id).await?;
    Ok(TransitionOutcome {
        tracking,
        enrollment,
    })
}

fn ensure_can_view(actor: &Actor, tracking: &PaymentStatusTracking) -> CoreResult<()> {
    if actor.is_admin() || actor.id == tracking.user_id {
        return Ok(());
    }
    Err(CoreError::Forbidden(format!(
        "payment tracking {} belongs to another user",
        tracking.id
    )))
}

fn ensure_pending(tracking: &PaymentStatusTracking, target: &str) -> CoreResult<()> {
    if tracking.status != PaymentStatus::Pending {
        return Err(CoreError::Conflict(format!(
            "payment tracking {} is {}; only pending payments can be {target}",
            tracking.id,
            tracking.status.as_str()
        )));
    }
    Ok(())
}

/// Writes `next` only if nobody moved the record since `current` was read.
async fn commit(
    state: &AppState,
    current: &PaymentStatusTracking,
    mut next: PaymentStatusTracking,
) -> CoreResult<PaymentStatusTracking> {
    next.version = current.version + 1;
    next.updated_at = state.clock.now();
    Ok(state.store.swap_tracking(current.version, next).await?)
}

/// Copies a committed tracker transition onto its enrollment.
///
/// The copy is tagged with the tracker version. When a later transition has already been
/// mirrored, this copy is dropped and the stored enrollment is returned instead.
async fn mirror_enrollment<F>(
    state: &AppState,
    tracking: &PaymentStatusTracking,
    apply: F,
) -> CoreResult<EnrollmentRequest>
where
    F: FnOnce(&mut EnrollmentRequest),
{
    let mut enrollment = state.store.get_enrollment(&tracking.enrollment_id).await?;
    apply(&mut enrollment);
    enrollment.tracking_version = tracking.version;
    enrollment.updated_at = state.clock.now();
    let stored = state
        .store
        .update_enrollment_mirror(enrollment)
        .await
        .map_err(|e| {
            error!(
                tracking_id = %tracking.id,
                enrollment_id = %tracking.enrollment_id,
                error = %e,
                "enrollment mirror failed after tracking transition"
            );
            CoreError::from(e)
        })?;
    if stored.tracking_version > tracking.version {
        info!(
            tracking_id = %tracking.id,
            enrollment_id = %tracking.enrollment_id,
            mirrored_version = tracking.version,
            stored_version = stored.tracking_version,
            "newer transition already mirrored; stale copy dropped"
        );
    }
    Ok(stored)
}
