use crate::module::course::model::{AuditChanges, CourseAuditLogEntry};
use crate::module::course::schema::AuditAction;
use crate::service::authz_service::Actor;
use crate::service::metrics_service;
use crate::store::AuditStore;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, info};
use uuid::Uuid;

/// Sparse before/after maps accumulated while an edit is computed in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    before: BTreeMap<String, Value>,
    after: BTreeMap<String, Value>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `field` only when the serialized values differ. Returns whether it did.
    pub fn record<T: Serialize + ?Sized>(&mut self, field: &str, old: &T, new: &T) -> bool {
        let old = to_value(old);
        let new = to_value(new);
        if old == new {
            return false;
        }
        self.before.insert(field.to_string(), old);
        self.after.insert(field.to_string(), new);
        true
    }

    /// Records a field whose previous state is unknown or irrelevant (creation).
    pub fn record_new<T: Serialize + ?Sized>(&mut self, field: &str, new: &T) {
        self.after.insert(field.to_string(), to_value(new));
    }

    pub fn is_empty(&self) -> bool {
        self.after.is_empty()
    }

    pub fn changed_fields(&self) -> Vec<String> {
        self.after.keys().cloned().collect()
    }

    pub fn into_changes(self) -> AuditChanges {
        AuditChanges {
            before: self.before,
            after: self.after,
        }
    }
}

/// Key for a nested field such as one lesson's video link.
///
/// Keys are stored as document field names, so the path uses `/` rather than `.`.
pub fn field_path(parts: &[&str]) -> String {
    parts.join("/")
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub fn build_entry(
    course_id: &str,
    actor: &Actor,
    action: AuditAction,
    changes: ChangeSet,
    reason: Option<String>,
    timestamp: i64,
) -> CourseAuditLogEntry {
    let changed_fields = changes.changed_fields();
    CourseAuditLogEntry {
        id: format!("audit-{}", Uuid::now_v7().simple()),
        course: course_id.to_string(),
        admin: actor.id.clone(),
        action,
        changes: changes.into_changes(),
        changed_fields,
        reason,
        ip_address: actor.ip_address.clone(),
        user_agent: actor.user_agent.clone(),
        timestamp,
    }
}

/// Appends one entry. Failures are logged and swallowed so they never block the mutation
/// being described.
pub async fn record<S>(store: &S, entry: CourseAuditLogEntry) -> Option<CourseAuditLogEntry>
where
    S: AuditStore + ?Sized,
{
    if entry.changed_fields.is_empty() {
        return None;
    }
    match store.append_audit(entry.clone()).await {
        Ok(()) => {
            info!(
                course_id = %entry.course,
                admin = %entry.admin,
                action = entry.action.as_str(),
                fields = ?entry.changed_fields,
                "course audit entry written"
            );
            Some(entry)
        }
        Err(e) => {
            metrics_service::inc_audit_write_failures();
            error!(course_id = %entry.course, error = %e, "course audit write failed");
            None
        }
    }
}
