use super::schema::AuditAction;
use crate::service::storage_service::UploadDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub price: i64,
    pub published: bool,
    pub thumbnail: Option<UploadDescriptor>,
    pub intro_video: Option<UploadDescriptor>,
    pub intro_video_link: Option<String>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub video_link: Option<String>,
    pub video_upload: Option<UploadDescriptor>,
    #[serde(default)]
    pub resources: Vec<UploadDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditChanges {
    pub before: BTreeMap<String, Value>,
    pub after: BTreeMap<String, Value>,
}

/// Append-only record of one admin mutation. `changed_fields` mirrors the keys of `changes.after`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAuditLogEntry {
    pub id: String,
    pub course: String,
    pub admin: String,
    pub action: AuditAction,
    pub changes: AuditChanges,
    pub changed_fields: Vec<String>,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: i64,
}
