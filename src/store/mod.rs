use crate::module::course::model::{Course, CourseAuditLogEntry};
use crate::module::enrollment::model::EnrollmentRequest;
use crate::module::payment_tracking::model::PaymentStatusTracking;
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod mongo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn get_course(&self, course_id: &str) -> StoreResult<Course>;
    async fn insert_course(&self, course: Course) -> StoreResult<Course>;
    async fn save_course(&self, course: Course) -> StoreResult<Course>;
    async fn delete_course(&self, course_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Must fail with `Duplicate` when `(user_id, course_id)` already exists. The check and the
    /// write are a single atomic step in every backend.
    async fn insert_enrollment(&self, enrollment: EnrollmentRequest) -> StoreResult<EnrollmentRequest>;
    async fn get_enrollment(&self, enrollment_id: &str) -> StoreResult<EnrollmentRequest>;
    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> StoreResult<Option<EnrollmentRequest>>;
    /// Stores `enrollment` only if its `tracking_version` is newer than the stored one and
    /// returns the record that is current afterwards. An older mirror never overwrites a newer one.
    async fn update_enrollment_mirror(
        &self,
        enrollment: EnrollmentRequest,
    ) -> StoreResult<EnrollmentRequest>;
}

#[async_trait]
pub trait PaymentTrackingStore: Send + Sync {
    /// Must fail with `Duplicate` when a tracker for the same enrollment already exists.
    async fn insert_tracking(
        &self,
        tracking: PaymentStatusTracking,
    ) -> StoreResult<PaymentStatusTracking>;
    async fn get_tracking(&self, tracking_id: &str) -> StoreResult<PaymentStatusTracking>;
    async fn find_tracking_by_enrollment(
        &self,
        enrollment_id: &str,
    ) -> StoreResult<Option<PaymentStatusTracking>>;
    /// Replaces the stored record only if its `version` still equals `expected_version`;
    /// otherwise fails with `Conflict`.
    async fn swap_tracking(
        &self,
        expected_version: i64,
        next: PaymentStatusTracking,
    ) -> StoreResult<PaymentStatusTracking>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: CourseAuditLogEntry) -> StoreResult<()>;
    /// Newest first.
    async fn list_audit(&self, course_id: &str) -> StoreResult<Vec<CourseAuditLogEntry>>;
}

pub trait Store: CourseStore + EnrollmentStore + PaymentTrackingStore + AuditStore {
    fn backend_name(&self) -> &'static str;
    fn is_durable(&self) -> bool;
}
