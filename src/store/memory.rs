//! In-memory store.
//!
//! Used by tests, local development, and as the fallback when MongoDB is not configured.
//! Not durable. Uniqueness and compare-and-swap guarantees hold within one process because each
//! check and its write happen under the same write lock.
use super::{
    AuditStore, CourseStore, EnrollmentStore, PaymentTrackingStore, Store, StoreError,
    StoreResult,
};
use crate::module::course::model::{Course, CourseAuditLogEntry};
use crate::module::enrollment::model::EnrollmentRequest;
use crate::module::payment_tracking::model::PaymentStatusTracking;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    courses: RwLock<HashMap<String, Course>>,
    enrollments: RwLock<EnrollmentTables>,
    trackings: RwLock<TrackingTables>,
    audit: RwLock<Vec<CourseAuditLogEntry>>,
}

#[derive(Debug, Default)]
struct EnrollmentTables {
    by_id: HashMap<String, EnrollmentRequest>,
    id_by_key: HashMap<(String, String), String>,
}

#[derive(Debug, Default)]
struct TrackingTables {
    by_id: HashMap<String, PaymentStatusTracking>,
    id_by_enrollment: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn get_course(&self, course_id: &str) -> StoreResult<Course> {
        self.courses
            .read()
            .await
            .get(course_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("course {course_id}")))
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let mut courses = self.courses.write().await;
        if courses.contains_key(&course.id) {
            return Err(StoreError::Duplicate(format!("course {}", course.id)));
        }
        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn save_course(&self, course: Course) -> StoreResult<Course> {
        let mut courses = self.courses.write().await;
        let slot = courses
            .get_mut(&course.id)
            .ok_or_else(|| StoreError::NotFound(format!("course {}", course.id)))?;
        *slot = course.clone();
        Ok(course)
    }

    async fn delete_course(&self, course_id: &str) -> StoreResult<()> {
        self.courses
            .write()
            .await
            .remove(course_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("course {course_id}")))
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn insert_enrollment(&self, enrollment: EnrollmentRequest) -> StoreResult<EnrollmentRequest> {
        let mut tables = self.enrollments.write().await;
        let key = (enrollment.user_id.clone(), enrollment.course_id.clone());
        if tables.id_by_key.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "enrollment for user {} and course {}",
                key.0, key.1
            )));
        }
        tables.id_by_key.insert(key, enrollment.id.clone());
        tables
            .by_id
            .insert(enrollment.id.clone(), enrollment.clone());
        Ok(enrollment)
    }

    async fn get_enrollment(&self, enrollment_id: &str) -> StoreResult<EnrollmentRequest> {
        self.enrollments
            .read()
            .await
            .by_id
            .get(enrollment_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("enrollment {enrollment_id}")))
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> StoreResult<Option<EnrollmentRequest>> {
        let tables = self.enrollments.read().await;
        let key = (user_id.to_string(), course_id.to_string());
        Ok(tables
            .id_by_key
            .get(&key)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn update_enrollment_mirror(
        &self,
        enrollment: EnrollmentRequest,
    ) -> StoreResult<EnrollmentRequest> {
        let mut tables = self.enrollments.write().await;
        let slot = tables
            .by_id
            .get_mut(&enrollment.id)
            .ok_or_else(|| StoreError::NotFound(format!("enrollment {}", enrollment.id)))?;
        if slot.user_id != enrollment.user_id || slot.course_id != enrollment.course_id {
            return Err(StoreError::Conflict(
                "enrollment identity cannot change".to_string(),
            ));
        }
        if slot.tracking_version >= enrollment.tracking_version {
            return Ok(slot.clone());
        }
        *slot = enrollment.clone();
        Ok(enrollment)
    }
}

#[async_trait]
impl PaymentTrackingStore for MemoryStore {
    async fn insert_tracking(
        &self,
        tracking: PaymentStatusTracking,
    ) -> StoreResult<PaymentStatusTracking> {
        let mut tables = self.trackings.write().await;
        if tables.id_by_enrollment.contains_key(&tracking.enrollment_id) {
            return Err(StoreError::Duplicate(format!(
                "payment tracking for enrollment {}",
                tracking.enrollment_id
            )));
        }
        tables
            .id_by_enrollment
            .insert(tracking.enrollment_id.clone(), tracking.id.clone());
        tables.by_id.insert(tracking.id.clone(), tracking.clone());
        Ok(tracking)
    }

    async fn get_tracking(&self, tracking_id: &str) -> StoreResult<PaymentStatusTracking> {
        self.trackings
            .read()
            .await
            .by_id
            .get(tracking_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("payment tracking {tracking_id}")))
    }

    async fn find_tracking_by_enrollment(
        &self,
        enrollment_id: &str,
    ) -> StoreResult<Option<PaymentStatusTracking>> {
        let tables = self.trackings.read().await;
        Ok(tables
            .id_by_enrollment
            .get(enrollment_id)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn swap_tracking(
        &self,
        expected_version: i64,
        next: PaymentStatusTracking,
    ) -> StoreResult<PaymentStatusTracking> {
        let mut tables = self.trackings.write().await;
        let slot = tables
            .by_id
            .get_mut(&next.id)
            .ok_or_else(|| StoreError::NotFound(format!("payment tracking {}", next.id)))?;
        if slot.version != expected_version {
            return Err(StoreError::Conflict(format!(
                "payment tracking {} changed concurrently (expected version {expected_version}, found {})",
                next.id, slot.version
            )));
        }
        *slot = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: CourseAuditLogEntry) -> StoreResult<()> {
        self.audit.write().await.push(entry);
        Ok(())
    }

    async fn list_audit(&self, course_id: &str) -> StoreResult<Vec<CourseAuditLogEntry>> {
        let audit = self.audit.read().await;
        Ok(audit
            .iter()
            .rev()
            .filter(|e| e.course == course_id)
            .cloned()
            .collect())
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }
}
