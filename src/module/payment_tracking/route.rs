use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/enrollments/:enrollment_id/approve",
            post(controller::approve_enrollment),
        )
        .route(
            "/v1/enrollments/:enrollment_id/reject",
            post(controller::reject_enrollment),
        )
        .route(
            "/v1/enrollments/:enrollment_id/payment-tracking",
            get(controller::get_tracking_for_enrollment),
        )
        .route(
            "/v1/payment-tracking/:tracking_id",
            get(controller::get_tracking),
        )
        .route(
            "/v1/payment-tracking/:tracking_id/retry",
            post(controller::request_retry),
        )
        .with_state(state)
}
