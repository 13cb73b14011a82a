use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, patch, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/courses", post(controller::create_course))
        .route(
            "/v1/courses/:course_id",
            patch(controller::edit_course).delete(controller::delete_course),
        )
        .route(
            "/v1/courses/:course_id/audit",
            get(controller::list_course_audit),
        )
        .route(
            "/v1/courses/:course_id/lessons/:lesson_id/video",
            post(controller::add_lesson_video)
                .put(controller::update_lesson_video)
                .delete(controller::remove_lesson_video),
        )
        .route(
            "/v1/courses/:course_id/lessons/:lesson_id/resources",
            post(controller::add_lesson_resources),
        )
        .with_state(state)
}
