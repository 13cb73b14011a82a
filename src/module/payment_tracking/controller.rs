use super::crud;
use super::schema::{RejectPaymentRequest, TrackingResponse, TransitionOutcome};
use crate::app::AppState;
use crate::error::CoreError;
use crate::module::error::AppError;
use crate::service::authz_service::actor_from_headers;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::error;

pub async fn approve_enrollment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::approve_enrollment(&state, &actor, &enrollment_id).await
    }
    .await;
    tracking_response(result, "payment approval rejected")
}

pub async fn reject_enrollment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
    Json(req): Json<RejectPaymentRequest>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::reject_enrollment(&state, &actor, &enrollment_id, req.reason, req.notes).await
    }
    .await;
    tracking_response(result, "payment rejection rejected")
}

pub async fn get_tracking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tracking_id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::get_tracking(&state, &actor, &tracking_id).await
    }
    .await;
    tracking_response(result, "payment tracking lookup failed")
}

pub async fn get_tracking_for_enrollment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(enrollment_id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::get_tracking_for_enrollment(&state, &actor, &enrollment_id).await
    }
    .await;
    tracking_response(result, "payment tracking lookup failed")
}

pub async fn request_retry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tracking_id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::request_retry(&state, &actor, &tracking_id).await
    }
    .await;
    tracking_response(result, "payment retry rejected")
}

fn tracking_response(
    result: Result<TransitionOutcome, CoreError>,
    context: &str,
) -> (StatusCode, Json<TrackingResponse>) {
    match result {
        Ok(outcome) => {
            let reason = if outcome.tracking.is_terminal() {
                format!("payment {} (final)", outcome.tracking.status.as_str())
            } else {
                format!("payment {}", outcome.tracking.status.as_str())
            };
            (
                StatusCode::OK,
                Json(TrackingResponse {
                    ok: true,
                    tracking: Some(outcome.tracking),
                    enrollment: Some(outcome.enrollment),
                    error_code: None,
                    reason,
                }),
            )
        }
        Err(err) => {
            let err = AppError::from(err);
            error!(error_code = err.code, reason = %err.message, "{context}");
            (
                err.status,
                Json(TrackingResponse {
                    ok: false,
                    tracking: None,
                    enrollment: None,
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}
