use super::model::{Course, CourseAuditLogEntry};
use crate::service::storage_service::{FilePayload, FileUpload};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Published,
    Unpublished,
    VideoAdded,
    VideoUpdated,
    VideoRemoved,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Published => "published",
            Self::Unpublished => "unpublished",
            Self::VideoAdded => "video_added",
            Self::VideoUpdated => "video_updated",
            Self::VideoRemoved => "video_removed",
        }
    }
}

/// Scalar edits. `None` leaves a field untouched; for nullable fields an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseFieldEdits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub price: Option<i64>,
    pub published: Option<bool>,
    #[serde(alias = "introVideoLink")]
    pub intro_video_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseMediaFiles {
    pub thumbnail: Option<FileUpload>,
    pub intro_video: Option<FileUpload>,
    pub materials: Vec<FileUpload>,
}

impl CourseMediaFiles {
    pub fn is_empty(&self) -> bool {
        self.thumbnail.is_none() && self.intro_video.is_none() && self.materials.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonDraft {
    pub title: String,
    pub video_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<LessonDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub published: bool,
    #[serde(alias = "introVideoLink")]
    pub intro_video_link: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleDraft>,
    /// Owner to assign when an admin creates a course on an instructor's behalf.
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub course: Course,
    pub audit_entry: Option<CourseAuditLogEntry>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(flatten)]
    pub draft: CourseDraft,
    pub thumbnail: Option<FilePayload>,
    pub intro_video: Option<FilePayload>,
    #[serde(default)]
    pub materials: Vec<FilePayload>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditCourseRequest {
    #[serde(flatten)]
    pub edits: CourseFieldEdits,
    pub thumbnail: Option<FilePayload>,
    pub intro_video: Option<FilePayload>,
    #[serde(default)]
    pub materials: Vec<FilePayload>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteCourseRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub ok: bool,
    pub course: Option<Course>,
    pub audit_entry_id: Option<String>,
    pub warnings: Vec<String>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditHistoryResponse {
    pub found: bool,
    pub course_id: String,
    pub entries: Vec<CourseAuditLogEntry>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonVideoRequest {
    #[serde(alias = "videoLink")]
    pub video_link: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonResourcesRequest {
    pub files: Vec<FilePayload>,
    pub reason: Option<String>,
}

impl CourseMediaFiles {
    pub fn from_payloads(
        thumbnail: Option<&FilePayload>,
        intro_video: Option<&FilePayload>,
        materials: &[FilePayload],
    ) -> Result<Self, crate::error::CoreError> {
        Ok(Self {
            thumbnail: thumbnail.map(FilePayload::decode).transpose()?,
            intro_video: intro_video.map(FilePayload::decode).transpose()?,
            materials: materials
                .iter()
                .map(FilePayload::decode)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
