use super::crud;
use super::schema::{
    AuditHistoryResponse, CourseMediaFiles, CourseResponse, CreateCourseRequest,
    DeleteCourseRequest, EditCourseRequest, EditOutcome, LessonResourcesRequest,
    LessonVideoRequest,
};
use crate::app::AppState;
use crate::error::CoreError;
use crate::module::error::AppError;
use crate::service::authz_service::actor_from_headers;
use crate::service::storage_service::FilePayload;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::error;

pub async fn create_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCourseRequest>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        let media = CourseMediaFiles::from_payloads(
            req.thumbnail.as_ref(),
            req.intro_video.as_ref(),
            &req.materials,
        )?;
        crud::create_course(&state, &actor, req.draft, media, req.reason).await
    }
    .await;
    course_response(result, StatusCode::CREATED)
}

pub async fn edit_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
    Json(req): Json<EditCourseRequest>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        let media = CourseMediaFiles::from_payloads(
            req.thumbnail.as_ref(),
            req.intro_video.as_ref(),
            &req.materials,
        )?;
        crud::apply_edit(&state, &actor, &course_id, req.edits, media, req.reason).await
    }
    .await;
    course_response(result, StatusCode::OK)
}

pub async fn delete_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
    body: Option<Json<DeleteCourseRequest>>,
) -> impl IntoResponse {
    let reason = body.and_then(|Json(req)| req.reason);
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::delete_course(&state, &actor, &course_id, reason).await
    }
    .await;
    match result {
        Ok(entry) => (
            StatusCode::OK,
            Json(CourseResponse {
                ok: true,
                course: None,
                audit_entry_id: entry.map(|e| e.id),
                warnings: Vec::new(),
                error_code: None,
                reason: format!("course {course_id} deleted"),
            }),
        ),
        Err(err) => error_course(err.into()),
    }
}

pub async fn add_lesson_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((course_id, lesson_id)): Path<(String, String)>,
    Json(req): Json<LessonVideoRequest>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::add_lesson_video(&state, &actor, &course_id, &lesson_id, &req.video_link, req.reason)
            .await
    }
    .await;
    course_response(result, StatusCode::OK)
}

pub async fn update_lesson_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((course_id, lesson_id)): Path<(String, String)>,
    Json(req): Json<LessonVideoRequest>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::update_lesson_video(
            &state,
            &actor,
            &course_id,
            &lesson_id,
            &req.video_link,
            req.reason,
        )
        .await
    }
    .await;
    course_response(result, StatusCode::OK)
}

pub async fn remove_lesson_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((course_id, lesson_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::remove_lesson_video(&state, &actor, &course_id, &lesson_id, None).await
    }
    .await;
    course_response(result, StatusCode::OK)
}

pub async fn add_lesson_resources(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((course_id, lesson_id)): Path<(String, String)>,
    Json(req): Json<LessonResourcesRequest>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        let files = req
            .files
            .iter()
            .map(FilePayload::decode)
            .collect::<Result<Vec<_>, _>>()?;
        crud::add_lesson_resources(&state, &actor, &course_id, &lesson_id, files, req.reason).await
    }
    .await;
    course_response(result, StatusCode::OK)
}

pub async fn list_course_audit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let actor = actor_from_headers(&headers)?;
        crud::list_course_audit(&state, &actor, &course_id).await
    }
    .await;
    match result {
        Ok(entries) => (
            StatusCode::OK,
            Json(AuditHistoryResponse {
                found: !entries.is_empty(),
                course_id,
                reason: format!("{} audit entries", entries.len()),
                entries,
                error_code: None,
            }),
        ),
        Err(err) => {
            let err = AppError::from(err);
            error!(error_code = err.code, reason = %err.message, "course audit lookup failed");
            (
                err.status,
                Json(AuditHistoryResponse {
                    found: false,
                    course_id,
                    entries: Vec::new(),
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

fn course_response(
    result: Result<EditOutcome, CoreError>,
    success: StatusCode,
) -> (StatusCode, Json<CourseResponse>) {
    match result {
        Ok(outcome) => {
            let reason = match &outcome.audit_entry {
                Some(entry) => format!("{} recorded", entry.action.as_str()),
                None => "no changes".to_string(),
            };
            (
                success,
                Json(CourseResponse {
                    ok: true,
                    audit_entry_id: outcome.audit_entry.map(|e| e.id),
                    course: Some(outcome.course),
                    warnings: outcome.warnings,
                    error_code: None,
                    reason,
                }),
            )
        }
        Err(err) => error_course(err.into()),
    }
}

fn error_course(err: AppError) -> (StatusCode, Json<CourseResponse>) {
    error!(error_code = err.code, reason = %err.message, "course mutation rejected");
    (
        err.status,
        Json(CourseResponse {
            ok: false,
            course: None,
            audit_entry_id: None,
            warnings: Vec::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
