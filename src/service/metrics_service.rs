use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REMOTE_UPLOADS: AtomicU64 = AtomicU64::new(0);
static LOCAL_FALLBACKS: AtomicU64 = AtomicU64::new(0);
static REMOTE_ATTEMPT_FAILURES: AtomicU64 = AtomicU64::new(0);
static AUDIT_WRITE_FAILURES: AtomicU64 = AtomicU64::new(0);
static PAYMENT_RETRIES_REQUESTED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub remote_uploads: u64,
    pub local_fallbacks: u64,
    pub remote_attempt_failures: u64,
    pub audit_write_failures: u64,
    pub payment_retries_requested: u64,
}

pub fn inc_remote_uploads() {
    REMOTE_UPLOADS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_local_fallbacks() {
    LOCAL_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_remote_attempt_failures() {
    REMOTE_ATTEMPT_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_audit_write_failures() {
    AUDIT_WRITE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_payment_retries_requested() {
    PAYMENT_RETRIES_REQUESTED.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        remote_uploads: REMOTE_UPLOADS.load(Ordering::Relaxed),
        local_fallbacks: LOCAL_FALLBACKS.load(Ordering::Relaxed),
        remote_attempt_failures: REMOTE_ATTEMPT_FAILURES.load(Ordering::Relaxed),
        audit_write_failures: AUDIT_WRITE_FAILURES.load(Ordering::Relaxed),
        payment_retries_requested: PAYMENT_RETRIES_REQUESTED.load(Ordering::Relaxed),
    }
}
