use super::{
    AuditStore, CourseStore, EnrollmentStore, PaymentTrackingStore, Store, StoreError,
    StoreResult,
};
use crate::infra::{
    COURSE_AUDIT_COLLECTION, COURSES_COLLECTION, ENROLLMENTS_COLLECTION, InfraClients,
    PAYMENT_TRACKING_COLLECTION,
};
use crate::module::course::model::{Course, CourseAuditLogEntry};
use crate::module::enrollment::model::EnrollmentRequest;
use crate::module::payment_tracking::model::PaymentStatusTracking;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Clone)]
pub struct MongoStore {
    infra: InfraClients,
}

impl MongoStore {
    pub fn new(infra: InfraClients) -> Self {
        Self { infra }
    }

    fn courses(&self) -> Collection<Course> {
        self.infra.mongo_db.collection(COURSES_COLLECTION)
    }

    fn enrollments(&self) -> Collection<EnrollmentRequest> {
        self.infra.mongo_db.collection(ENROLLMENTS_COLLECTION)
    }

    fn trackings(&self) -> Collection<PaymentStatusTracking> {
        self.infra.mongo_db.collection(PAYMENT_TRACKING_COLLECTION)
    }

    fn audit(&self) -> Collection<CourseAuditLogEntry> {
        self.infra.mongo_db.collection(COURSE_AUDIT_COLLECTION)
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY_CODE
    )
}

fn backend(op: &str, err: MongoError) -> StoreError {
    StoreError::Backend(format!("{op} failed: {err}"))
}

fn insert_error(what: String, op: &str, err: MongoError) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Duplicate(what)
    } else {
        backend(op, err)
    }
}

#[async_trait]
impl CourseStore for MongoStore {
    async fn get_course(&self, course_id: &str) -> StoreResult<Course> {
        self.courses()
            .find_one(doc! { "id": course_id })
            .await
            .map_err(|e| backend("course lookup", e))?
            .ok_or_else(|| StoreError::NotFound(format!("course {course_id}")))
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        self.courses()
            .insert_one(&course)
            .await
            .map_err(|e| insert_error(format!("course {}", course.id), "course insert", e))?;
        Ok(course)
    }

    async fn save_course(&self, course: Course) -> StoreResult<Course> {
        let result = self
            .courses()
            .replace_one(doc! { "id": &course.id }, &course)
            .await
            .map_err(|e| backend("course save", e))?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(format!("course {}", course.id)));
        }
        Ok(course)
    }

    async fn delete_course(&self, course_id: &str) -> StoreResult<()> {
        let result = self
            .courses()
            .delete_one(doc! { "id": course_id })
            .await
            .map_err(|e| backend("course delete", e))?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound(format!("course {course_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for MongoStore {
    async fn insert_enrollment(&self, enrollment: EnrollmentRequest) -> StoreResult<EnrollmentRequest> {
        self.enrollments()
            .insert_one(&enrollment)
            .await
            .map_err(|e| {
                insert_error(
                    format!(
                        "enrollment for user {} and course {}",
                        enrollment.user_id, enrollment.course_id
                    ),
                    "enrollment insert",
                    e,
                )
            })?;
        Ok(enrollment)
    }

    async fn get_enrollment(&self, enrollment_id: &str) -> StoreResult<EnrollmentRequest> {
        self.enrollments()
            .find_one(doc! { "id": enrollment_id })
            .await
            .map_err(|e| backend("enrollment lookup", e))?
            .ok_or_else(|| StoreError::NotFound(format!("enrollment {enrollment_id}")))
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> StoreResult<Option<EnrollmentRequest>> {
        self.enrollments()
            .find_one(doc! { "user_id": user_id, "course_id": course_id })
            .await
            .map_err(|e| backend("enrollment lookup", e))
    }

    async fn update_enrollment_mirror(
        &self,
        enrollment: EnrollmentRequest,
    ) -> StoreResult<EnrollmentRequest> {
        let result = self
            .enrollments()
            .replace_one(
                doc! {
                    "id": &enrollment.id,
                    "user_id": &enrollment.user_id,
                    "course_id": &enrollment.course_id,
                    "$or": [
                        { "tracking_version": { "$lt": enrollment.tracking_version } },
                        { "tracking_version": { "$exists": false } },
                    ],
                },
                &enrollment,
            )
            .await
            .map_err(|e| backend("enrollment update", e))?;
        if result.matched_count == 1 {
            return Ok(enrollment);
        }
        // Either missing or already carrying a newer mirror.
        self.get_enrollment(&enrollment.id).await
    }
}

#[async_trait]
impl PaymentTrackingStore for MongoStore {
    async fn insert_tracking(
        &self,
        tracking: PaymentStatusTracking,
    ) -> StoreResult<PaymentStatusTracking> {
        self.trackings()
            .insert_one(&tracking)
            .await
            .map_err(|e| {
                insert_error(
                    format!("payment tracking for enrollment {}", tracking.enrollment_id),
                    "payment tracking insert",
                    e,
                )
            })?;
        Ok(tracking)
    }

    async fn get_tracking(&self, tracking_id: &str) -> StoreResult<PaymentStatusTracking> {
        self.trackings()
            .find_one(doc! { "id": tracking_id })
            .await
            .map_err(|e| backend("payment tracking lookup", e))?
            .ok_or_else(|| StoreError::NotFound(format!("payment tracking {tracking_id}")))
    }

    async fn find_tracking_by_enrollment(
        &self,
        enrollment_id: &str,
    ) -> StoreResult<Option<PaymentStatusTracking>> {
        self.trackings()
            .find_one(doc! { "enrollment_id": enrollment_id })
            .await
            .map_err(|e| backend("payment tracking lookup", e))
    }

    async fn swap_tracking(
        &self,
        expected_version: i64,
        next: PaymentStatusTracking,
    ) -> StoreResult<PaymentStatusTracking> {
        let result = self
            .trackings()
            .replace_one(doc! { "id": &next.id, "version": expected_version }, &next)
            .await
            .map_err(|e| backend("payment tracking swap", e))?;
        if result.matched_count == 1 {
            return Ok(next);
        }
        // Distinguish a missing record from a lost race.
        match self.find_tracking_by_enrollment(&next.enrollment_id).await? {
            Some(current) => Err(StoreError::Conflict(format!(
                "payment tracking {} changed concurrently (expected version {expected_version}, found {})",
                next.id, current.version
            ))),
            None => Err(StoreError::NotFound(format!("payment tracking {}", next.id))),
        }
    }
}

#[async_trait]
impl AuditStore for MongoStore {
    async fn append_audit(&self, entry: CourseAuditLogEntry) -> StoreResult<()> {
        self.audit()
            .insert_one(&entry)
            .await
            .map_err(|e| insert_error(format!("audit entry {}", entry.id), "audit insert", e))?;
        Ok(())
    }

    async fn list_audit(&self, course_id: &str) -> StoreResult<Vec<CourseAuditLogEntry>> {
        let cursor = self
            .audit()
            .find(doc! { "course": course_id })
            .sort(doc! { "timestamp": -1, "_id": -1 })
            .await
            .map_err(|e| backend("audit lookup", e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| backend("audit cursor", e))
    }
}

impl Store for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn is_durable(&self) -> bool {
        true
    }
}
