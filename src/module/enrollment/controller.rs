use super::crud;
use super::schema::{EnrollmentResponse, PaymentInfo, SubmitEnrollmentRequest};
use crate::app::AppState;
use crate::module::error::AppError;
use crate::service::authz_service::actor_from_headers;
use crate::service::storage_service::FilePayload;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::{error, info};

pub async fn submit_enrollment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitEnrollmentRequest>,
) -> impl IntoResponse {
    if req.status.is_some() {
        info!(course_id = %req.course_id, "ignoring caller-supplied enrollment status");
    }
    let result = async {
        let actor = actor_from_headers(&headers)?;
        let proof = req.payment_proof.as_ref().map(FilePayload::decode).transpose()?;
        let payment = PaymentInfo {
            amount: req.payment_amount,
            method: req.payment_method,
            transaction_details: req.transaction_details,
        };
        crud::submit(&state, &actor, &req.course_id, payment, proof).await
    }
    .await;

    match result {
        Ok(outcome) => {
            let is_new = outcome.is_new();
            let enrollment = outcome.into_enrollment();
            let (status, reason) = if is_new {
                (StatusCode::CREATED, "enrollment request submitted".to_string())
            } else {
                (
                    StatusCode::OK,
                    format!("enrollment already exists with status {}", enrollment.status.as_str()),
                )
            };
            (
                status,
                Json(EnrollmentResponse {
                    accepted: true,
                    already_exists: !is_new,
                    enrollment: Some(enrollment),
                    error_code: None,
                    reason,
                }),
            )
        }
        Err(err) => error_enrollment(err.into(), "enrollment submission rejected"),
    }
}

pub async fn get_enrollment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::get_enrollment(&state, &actor, &enrollment_id).await
    }
    .await;

    match result {
        Ok(enrollment) => (
            StatusCode::OK,
            Json(EnrollmentResponse {
                accepted: true,
                already_exists: true,
                reason: format!("enrollment status {}", enrollment.status.as_str()),
                enrollment: Some(enrollment),
                error_code: None,
            }),
        ),
        Err(err) => error_enrollment(err.into(), "enrollment lookup failed"),
    }
}

fn error_enrollment(err: AppError, context: &str) -> (StatusCode, Json<EnrollmentResponse>) {
    error!(error_code = err.code, reason = %err.message, "{context}");
    (
        err.status,
        Json(EnrollmentResponse {
            accepted: false,
            already_exists: false,
            enrollment: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
