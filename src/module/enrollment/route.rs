use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/enrollments", post(controller::submit_enrollment))
        .route(
            "/v1/enrollments/:enrollment_id",
            get(controller::get_enrollment),
        )
        .with_state(state)
}
