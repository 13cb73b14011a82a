use super::model::{Course, CourseAuditLogEntry, CourseModule, Lesson};
use super::schema::{
    AuditAction, CourseDraft, CourseFieldEdits, CourseMediaFiles, EditOutcome, LessonDraft,
};
use crate::app::AppState;
use crate::error::{CoreError, CoreResult};
use crate::service::audit_service::{self, ChangeSet};
use crate::service::authz_service::{
    Actor, ActorRole, ensure_admin, ensure_identified, ensure_owner_or_admin,
};
use crate::service::storage_service::{BlobStore, FileUpload, StorageError, UploadDescriptor};
use crate::service::video_link_service;
use crate::store::StoreError;
use tracing::{info, warn};
use uuid::Uuid;

/// Internal title of the module (and its single lesson) that holds course-level PDF materials.
pub const MATERIALS_MODULE_TITLE: &str = "Course Materials";

pub const THUMBNAIL_FOLDER: &str = "thumbnails";
pub const INTRO_VIDEO_FOLDER: &str = "intro-videos";
pub const MATERIALS_FOLDER: &str = "materials";
pub const LESSON_RESOURCES_FOLDER: &str = "lesson-resources";

pub async fn create_course(
    state: &AppState,
    actor: &Actor,
    draft: CourseDraft,
    media: CourseMediaFiles,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    ensure_identified(actor)?;
    if actor.role == ActorRole::Learner {
        return Err(CoreError::Forbidden(
            "only instructors and admins may create courses".to_string(),
        ));
    }
    let owner_id = match draft.owner_id.as_deref().map(str::trim) {
        Some(owner) if !owner.is_empty() && actor.is_admin() => owner.to_string(),
        _ => actor.id.clone(),
    };

    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(CoreError::Validation("course title is required".to_string()));
    }
    validate_price(draft.price)?;
    validate_media(&media)?;
    let intro_video_link = normalize_optional(draft.intro_video_link.as_deref());
    if let Some(link) = &intro_video_link {
        validate_video_link(link)?;
    }
    let modules = build_modules(&draft.modules)?;

    let mut warnings = Vec::new();
    if let Some(link) = &intro_video_link {
        if video_link_service::is_duplicate(&modules, link) {
            warnings.push(duplicate_warning(link));
        }
    }

    let now = state.clock.now();
    let mut course = Course {
        id: format!("course-{}", Uuid::now_v7().simple()),
        owner_id,
        title,
        description: draft.description.trim().to_string(),
        category: normalize_optional(draft.category.as_deref()),
        level: normalize_optional(draft.level.as_deref()),
        language: normalize_optional(draft.language.as_deref()),
        price: draft.price,
        published: draft.published,
        thumbnail: None,
        intro_video: None,
        intro_video_link,
        modules,
        created_at: now,
        updated_at: now,
    };

    let mut uploaded: Vec<UploadDescriptor> = Vec::new();
    if let Err(e) = attach_media_strict(&state.blobs, &mut course, &media, &mut uploaded).await {
        discard_uploads(&state.blobs, &uploaded).await;
        return Err(e.into());
    }

    let course = match state.store.insert_course(course).await {
        Ok(course) => course,
        Err(e) => {
            discard_uploads(&state.blobs, &uploaded).await;
            return Err(e.into());
        }
    };
    info!(course_id = %course.id, owner_id = %course.owner_id, "course created");

    let mut changes = ChangeSet::new();
    changes.record_new("title", &course.title);
    changes.record_new("description", &course.description);
    changes.record_new("category", &course.category);
    changes.record_new("level", &course.level);
    changes.record_new("language", &course.language);
    changes.record_new("price", &course.price);
    changes.record_new("published", &course.published);
    changes.record_new("intro_video_link", &course.intro_video_link);
    changes.record_new("modules", &course.modules);
    if course.thumbnail.is_some() {
        changes.record_new("thumbnail", &course.thumbnail);
    }
    if course.intro_video.is_some() {
        changes.record_new("intro_video", &course.intro_video);
    }

    let audit_entry = write_audit(state, &course.id, actor, AuditAction::Created, changes, reason).await;
    Ok(EditOutcome {
        course,
        audit_entry,
        warnings,
    })
}

/// Applies scalar edits and media replacements to an existing course.
///
/// Validation is strict and happens before any upload or write. Media uploads are lenient: a
/// failure is logged, reported in `warnings` and skipped while the remaining edits still land.
/// Nothing is persisted and no audit entry is written when the computed diff is empty.
pub async fn apply_edit(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    edits: CourseFieldEdits,
    media: CourseMediaFiles,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    ensure_identified(actor)?;
    let current = state.store.get_course(course_id).await?;
    ensure_owner_or_admin(actor, &current.owner_id)?;

    validate_edits(&edits)?;
    validate_media(&media)?;

    let mut warnings = Vec::new();
    let mut next = current.clone();
    let mut changes = ChangeSet::new();

    if let Some(title) = &edits.title {
        let title = title.trim().to_string();
        if changes.record("title", &current.title, &title) {
            next.title = title;
        }
    }
    if let Some(description) = &edits.description {
        let description = description.trim().to_string();
        if changes.record("description", &current.description, &description) {
            next.description = description;
        }
    }
    apply_optional_text(&mut changes, "category", &current.category, &edits.category, &mut next.category);
    apply_optional_text(&mut changes, "level", &current.level, &edits.level, &mut next.level);
    apply_optional_text(&mut changes, "language", &current.language, &edits.language, &mut next.language);
    if let Some(price) = edits.price {
        if changes.record("price", &current.price, &price) {
            next.price = price;
        }
    }
    if let Some(published) = edits.published {
        if changes.record("published", &current.published, &published) {
            next.published = published;
        }
    }
    if edits.intro_video_link.is_some() {
        let link = normalize_optional(edits.intro_video_link.as_deref());
        if changes.record("intro_video_link", &current.intro_video_link, &link) {
            if let Some(url) = &link {
                if video_link_service::is_duplicate(&current.modules, url) {
                    warn!(course_id, url = %url, "intro video link duplicates a lesson video");
                    warnings.push(duplicate_warning(url));
                }
            }
            next.intro_video_link = link;
        }
    }

    // `fresh` is what this edit stored; `replaced` is what it supersedes once saved.
    let mut fresh: Vec<UploadDescriptor> = Vec::new();
    let mut replaced: Vec<UploadDescriptor> = Vec::new();
    if let Some(file) = &media.thumbnail {
        match state.blobs.upload(file, THUMBNAIL_FOLDER).await {
            Ok(descriptor) => {
                changes.record("thumbnail", &current.thumbnail, &Some(descriptor.clone()));
                replaced.extend(current.thumbnail.clone());
                fresh.push(descriptor.clone());
                next.thumbnail = Some(descriptor);
            }
            Err(e) => warnings.push(skip_media(course_id, "thumbnail", &e)),
        }
    }
    if let Some(file) = &media.intro_video {
        match state.blobs.upload(file, INTRO_VIDEO_FOLDER).await {
            Ok(descriptor) => {
                changes.record("intro_video", &current.intro_video, &Some(descriptor.clone()));
                replaced.extend(current.intro_video.clone());
                fresh.push(descriptor.clone());
                next.intro_video = Some(descriptor);
            }
            Err(e) => warnings.push(skip_media(course_id, "intro_video", &e)),
        }
    }
    if !media.materials.is_empty() {
        match upload_batch(&state.blobs, &media.materials, MATERIALS_FOLDER).await {
            Ok(resources) => {
                let previous = materials_of(&current.modules);
                changes.record("materials", &previous, &resources);
                replaced.extend(previous);
                fresh.extend(resources.iter().cloned());
                replace_materials(&mut next.modules, resources);
            }
            Err(e) => warnings.push(skip_media(course_id, "materials", &e)),
        }
    }

    if changes.is_empty() {
        info!(course_id, actor_id = %actor.id, "course edit is a no-op");
        return Ok(EditOutcome {
            course: current,
            audit_entry: None,
            warnings,
        });
    }

    next.updated_at = state.clock.now();
    let action = edit_action(&changes, next.published);
    let course = match state.store.save_course(next).await {
        Ok(course) => course,
        Err(e) => {
            discard_uploads(&state.blobs, &fresh).await;
            return Err(e.into());
        }
    };
    discard_uploads(&state.blobs, &replaced).await;
    info!(course_id, actor_id = %actor.id, fields = ?changes.changed_fields(), "course updated");

    let audit_entry = write_audit(state, course_id, actor, action, changes, reason).await;
    Ok(EditOutcome {
        course,
        audit_entry,
        warnings,
    })
}

pub async fn delete_course(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    reason: Option<String>,
) -> CoreResult<Option<CourseAuditLogEntry>> {
    ensure_identified(actor)?;
    let course = state.store.get_course(course_id).await?;
    ensure_owner_or_admin(actor, &course.owner_id)?;

    state.store.delete_course(course_id).await?;
    let blobs = course_blobs(&course);
    let blob_count = blobs.len();
    discard_uploads(&state.blobs, &blobs).await;
    info!(course_id, actor_id = %actor.id, blob_count, "course deleted");

    let mut changes = ChangeSet::new();
    changes.record("deleted", &false, &true);
    changes.record("title", &Some(course.title.as_str()), &None::<&str>);
    Ok(write_audit(state, course_id, actor, AuditAction::Deleted, changes, reason).await)
}

pub async fn add_lesson_video(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    lesson_id: &str,
    url: &str,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    let url = url.trim();
    let (mut course, lesson) = load_lesson_for_edit(state, actor, course_id, lesson_id).await?;
    validate_video_link(url)?;
    if lesson.video_link.is_some() {
        return Err(CoreError::Conflict(format!(
            "lesson {lesson_id} already has a video link"
        )));
    }
    if video_link_service::is_duplicate(&course.modules, url) {
        return Err(CoreError::Validation(duplicate_warning(url)));
    }

    set_lesson_link(&mut course, lesson_id, Some(url.to_string()));
    let mut changes = ChangeSet::new();
    changes.record(&lesson_field(lesson_id), &None::<&str>, &Some(url));
    persist_lesson_change(state, actor, course, AuditAction::VideoAdded, changes, reason).await
}

pub async fn update_lesson_video(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    lesson_id: &str,
    url: &str,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    let url = url.trim();
    let (mut course, lesson) = load_lesson_for_edit(state, actor, course_id, lesson_id).await?;
    validate_video_link(url)?;
    let Some(previous) = lesson.video_link.clone() else {
        return Err(CoreError::Conflict(format!(
            "lesson {lesson_id} has no video link to update"
        )));
    };
    if previous == url {
        return Ok(EditOutcome {
            course,
            audit_entry: None,
            warnings: Vec::new(),
        });
    }
    if video_link_service::is_duplicate(&course.modules, url) {
        return Err(CoreError::Validation(duplicate_warning(url)));
    }

    set_lesson_link(&mut course, lesson_id, Some(url.to_string()));
    let mut changes = ChangeSet::new();
    changes.record(&lesson_field(lesson_id), &Some(previous.as_str()), &Some(url));
    persist_lesson_change(state, actor, course, AuditAction::VideoUpdated, changes, reason).await
}

pub async fn remove_lesson_video(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    lesson_id: &str,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    let (mut course, lesson) = load_lesson_for_edit(state, actor, course_id, lesson_id).await?;
    let Some(previous) = lesson.video_link.clone() else {
        return Ok(EditOutcome {
            course,
            audit_entry: None,
            warnings: Vec::new(),
        });
    };

    set_lesson_link(&mut course, lesson_id, None);
    let mut changes = ChangeSet::new();
    changes.record(&lesson_field(lesson_id), &Some(previous.as_str()), &None::<&str>);
    persist_lesson_change(state, actor, course, AuditAction::VideoRemoved, changes, reason).await
}

/// Uploads lesson-level resources through the blob store and appends them in input order.
/// Strict: one failed upload aborts the whole batch.
pub async fn add_lesson_resources(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    lesson_id: &str,
    files: Vec<FileUpload>,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    let (mut course, lesson) = load_lesson_for_edit(state, actor, course_id, lesson_id).await?;
    if files.is_empty() {
        return Err(CoreError::Validation("at least one resource file is required".to_string()));
    }
    for file in &files {
        validate_pdf(file)?;
    }

    let uploaded = upload_batch(&state.blobs, &files, LESSON_RESOURCES_FOLDER).await?;
    let mut resources = lesson.resources.clone();
    resources.extend(uploaded.iter().cloned());

    let mut changes = ChangeSet::new();
    changes.record(
        &audit_service::field_path(&["lessons", lesson_id, "resources"]),
        &lesson.resources,
        &resources,
    );
    if let Some(target) = find_lesson_mut(&mut course.modules, lesson_id) {
        target.resources = resources;
    }

    match persist_lesson_change(state, actor, course, AuditAction::Updated, changes, reason).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            discard_uploads(&state.blobs, &uploaded).await;
            Err(e)
        }
    }
}

/// Audit history for a course, newest first. Owners may read their own course's history; the
/// history of a deleted course is admin-only.
pub async fn list_course_audit(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
) -> CoreResult<Vec<CourseAuditLogEntry>> {
    match state.store.get_course(course_id).await {
        Ok(course) => ensure_owner_or_admin(actor, &course.owner_id)?,
        Err(StoreError::NotFound(_)) => ensure_admin(actor)?,
        Err(e) => return Err(e.into()),
    }
    Ok(state.store.list_audit(course_id).await?)
}

async fn load_lesson_for_edit(
    state: &AppState,
    actor: &Actor,
    course_id: &str,
    lesson_id: &str,
) -> CoreResult<(Course, Lesson)> {
    ensure_identified(actor)?;
    let course = state.store.get_course(course_id).await?;
    ensure_owner_or_admin(actor, &course.owner_id)?;
    let lesson = course
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .find(|l| l.id == lesson_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound(format!("lesson {lesson_id} in course {course_id}")))?;
    Ok((course, lesson))
}

async fn persist_lesson_change(
    state: &AppState,
    actor: &Actor,
    mut course: Course,
    action: AuditAction,
    changes: ChangeSet,
    reason: Option<String>,
) -> CoreResult<EditOutcome> {
    course.updated_at = state.clock.now();
    let course = state.store.save_course(course).await?;
    info!(course_id = %course.id, action = action.as_str(), "lesson updated");
    let audit_entry = write_audit(state, &course.id, actor, action, changes, reason).await;
    Ok(EditOutcome {
        course,
        audit_entry,
        warnings: Vec::new(),
    })
}

async fn write_audit(
    state: &AppState,
    course_id: &str,
    actor: &Actor,
    action: AuditAction,
    changes: ChangeSet,
    reason: Option<String>,
) -> Option<CourseAuditLogEntry> {
    let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    let entry = audit_service::build_entry(
        course_id,
        actor,
        action,
        changes,
        reason,
        state.clock.now(),
    );
    audit_service::record(state.store.as_ref(), entry).await
}

async fn attach_media_strict(
    blobs: &BlobStore,
    course: &mut Course,
    media: &CourseMediaFiles,
    uploaded: &mut Vec<UploadDescriptor>,
) -> Result<(), StorageError> {
    if let Some(file) = &media.thumbnail {
        let descriptor = blobs.upload(file, THUMBNAIL_FOLDER).await?;
        uploaded.push(descriptor.clone());
        course.thumbnail = Some(descriptor);
    }
    if let Some(file) = &media.intro_video {
        let descriptor = blobs.upload(file, INTRO_VIDEO_FOLDER).await?;
        uploaded.push(descriptor.clone());
        course.intro_video = Some(descriptor);
    }
    if !media.materials.is_empty() {
        let resources = upload_batch(blobs, &media.materials, MATERIALS_FOLDER).await?;
        uploaded.extend(resources.iter().cloned());
        replace_materials(&mut course.modules, resources);
    }
    Ok(())
}

/// Uploads files sequentially so descriptors keep input order. On failure the files already
/// stored by this batch are removed before the error is returned.
async fn upload_batch(
    blobs: &BlobStore,
    files: &[FileUpload],
    folder: &str,
) -> Result<Vec<UploadDescriptor>, StorageError> {
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        match blobs.upload(file, folder).await {
            Ok(descriptor) => stored.push(descriptor),
            Err(e) => {
                discard_uploads(blobs, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

async fn discard_uploads(blobs: &BlobStore, descriptors: &[UploadDescriptor]) {
    for descriptor in descriptors {
        if !blobs.delete(descriptor).await {
            warn!(id = %descriptor.id, storage = descriptor.storage_type.as_str(), "orphaned upload left behind");
        }
    }
}

fn skip_media(course_id: &str, slot: &str, err: &StorageError) -> String {
    warn!(course_id, slot, error = %err, "media upload failed; keeping previous value");
    format!("{slot} upload failed and was skipped: {err}")
}

fn duplicate_warning(url: &str) -> String {
    format!("video link {url} is already used by a lesson in this course")
}

fn edit_action(changes: &ChangeSet, published: bool) -> AuditAction {
    match changes.changed_fields().as_slice() {
        [only] if only == "published" && published => AuditAction::Published,
        [only] if only == "published" => AuditAction::Unpublished,
        _ => AuditAction::Updated,
    }
}

fn course_blobs(course: &Course) -> Vec<UploadDescriptor> {
    let mut blobs: Vec<UploadDescriptor> = Vec::new();
    blobs.extend(course.thumbnail.clone());
    blobs.extend(course.intro_video.clone());
    for lesson in course.modules.iter().flat_map(|m| m.lessons.iter()) {
        blobs.extend(lesson.video_upload.clone());
        blobs.extend(lesson.resources.iter().cloned());
    }
    blobs
}

fn materials_of(modules: &[CourseModule]) -> Vec<UploadDescriptor> {
    modules
        .iter()
        .find(|m| m.title == MATERIALS_MODULE_TITLE)
        .map(|m| {
            m.lessons
                .iter()
                .flat_map(|l| l.resources.iter().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Creates or replaces the single well-known materials module/lesson.
fn replace_materials(modules: &mut Vec<CourseModule>, resources: Vec<UploadDescriptor>) {
    if let Some(module) = modules.iter_mut().find(|m| m.title == MATERIALS_MODULE_TITLE) {
        let lesson_id = module
            .lessons
            .first()
            .map(|l| l.id.clone())
            .unwrap_or_else(new_lesson_id);
        module.lessons = vec![materials_lesson(lesson_id, resources)];
        return;
    }
    modules.push(CourseModule {
        id: format!("module-{}", Uuid::now_v7().simple()),
        title: MATERIALS_MODULE_TITLE.to_string(),
        lessons: vec![materials_lesson(new_lesson_id(), resources)],
    });
}

fn materials_lesson(id: String, resources: Vec<UploadDescriptor>) -> Lesson {
    Lesson {
        id,
        title: MATERIALS_MODULE_TITLE.to_string(),
        video_link: None,
        video_upload: None,
        resources,
    }
}

fn new_lesson_id() -> String {
    format!("lesson-{}", Uuid::now_v7().simple())
}

fn build_modules(drafts: &[super::schema::ModuleDraft]) -> CoreResult<Vec<CourseModule>> {
    let mut modules: Vec<CourseModule> = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("module title is required".to_string()));
        }
        let mut lessons = Vec::with_capacity(draft.lessons.len());
        for lesson in &draft.lessons {
            lessons.push(build_lesson(lesson, &modules, &lessons)?);
        }
        modules.push(CourseModule {
            id: format!("module-{}", Uuid::now_v7().simple()),
            title: title.to_string(),
            lessons,
        });
    }
    Ok(modules)
}

fn build_lesson(
    draft: &LessonDraft,
    built_modules: &[CourseModule],
    siblings: &[Lesson],
) -> CoreResult<Lesson> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("lesson title is required".to_string()));
    }
    let video_link = normalize_optional(draft.video_link.as_deref());
    if let Some(url) = &video_link {
        validate_video_link(url)?;
        let in_module = siblings.iter().any(|l| l.video_link.as_deref() == Some(url));
        if in_module || video_link_service::is_duplicate(built_modules, url) {
            return Err(CoreError::Validation(duplicate_warning(url)));
        }
    }
    Ok(Lesson {
        id: new_lesson_id(),
        title: title.to_string(),
        video_link,
        video_upload: None,
        resources: Vec::new(),
    })
}

fn find_lesson_mut<'a>(modules: &'a mut [CourseModule], lesson_id: &str) -> Option<&'a mut Lesson> {
    modules
        .iter_mut()
        .flat_map(|m| m.lessons.iter_mut())
        .find(|l| l.id == lesson_id)
}

fn set_lesson_link(course: &mut Course, lesson_id: &str, link: Option<String>) {
    if let Some(lesson) = find_lesson_mut(&mut course.modules, lesson_id) {
        lesson.video_link = link;
    }
}

fn lesson_field(lesson_id: &str) -> String {
    audit_service::field_path(&["lessons", lesson_id, "video_link"])
}

fn apply_optional_text(
    changes: &mut ChangeSet,
    field: &str,
    current: &Option<String>,
    edit: &Option<String>,
    target: &mut Option<String>,
) {
    if edit.is_none() {
        return;
    }
    let value = normalize_optional(edit.as_deref());
    if changes.record(field, current, &value) {
        *target = value;
    }
}

/// Trims; an empty string means "cleared".
fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn validate_edits(edits: &CourseFieldEdits) -> CoreResult<()> {
    if let Some(title) = &edits.title {
        if title.trim().is_empty() {
            return Err(CoreError::Validation("course title cannot be empty".to_string()));
        }
    }
    if let Some(price) = edits.price {
        validate_price(price)?;
    }
    if let Some(link) = normalize_optional(edits.intro_video_link.as_deref()) {
        validate_video_link(&link)?;
    }
    Ok(())
}

fn validate_price(price: i64) -> CoreResult<()> {
    if price < 0 {
        return Err(CoreError::Validation(format!(
            "course price must not be negative, got {price}"
        )));
    }
    Ok(())
}

fn validate_video_link(url: &str) -> CoreResult<()> {
    if !video_link_service::is_valid(url) {
        return Err(CoreError::Validation(format!(
            "unsupported video link {url:?}; use a YouTube, Vimeo, Dailymotion or Twitch link or a direct video file URL"
        )));
    }
    Ok(())
}

fn validate_media(media: &CourseMediaFiles) -> CoreResult<()> {
    if let Some(file) = &media.thumbnail {
        validate_kind(file, "thumbnail", "image/")?;
    }
    if let Some(file) = &media.intro_video {
        validate_kind(file, "intro video", "video/")?;
    }
    for file in &media.materials {
        validate_pdf(file)?;
    }
    Ok(())
}

fn validate_kind(file: &FileUpload, slot: &str, mime_prefix: &str) -> CoreResult<()> {
    if file.bytes.is_empty() {
        return Err(CoreError::Validation(format!("{slot} file {} is empty", file.name)));
    }
    if !file.mime_type.to_ascii_lowercase().starts_with(mime_prefix) {
        return Err(CoreError::Validation(format!(
            "{slot} must be of type {mime_prefix}*, got {}",
            file.mime_type
        )));
    }
    Ok(())
}

fn validate_pdf(file: &FileUpload) -> CoreResult<()> {
    if file.bytes.is_empty() {
        return Err(CoreError::Validation(format!("material file {} is empty", file.name)));
    }
    let is_pdf = file.mime_type.eq_ignore_ascii_case("application/pdf")
        || file.name.to_ascii_lowercase().ends_with(".pdf");
    if !is_pdf {
        return Err(CoreError::Validation(format!(
            "course materials must be PDF files, got {} ({})",
            file.name, file.mime_type
        )));
    }
    Ok(())
}
