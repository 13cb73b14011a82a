use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::course::route::register_routes as course_routes;
use crate::module::enrollment::route::register_routes as enrollment_routes;
use crate::module::health;
use crate::module::payment_tracking::route::register_routes as payment_tracking_routes;
use crate::service::clock_service::{Clock, SystemClock};
use crate::service::drive_service::{DriveClient, DriveSettings, RemoteObjectStore};
use crate::service::local_disk_service::DiskFileStore;
use crate::service::storage_service::{BlobStore, BlobStoreSettings};
use crate::store::Store;
use crate::store::memory::MemoryStore;
use crate::store::mongo::MongoStore;
use axum::Router;
use axum::http::Method;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Limits applied by the payment retry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPolicy {
    pub max_retries: u32,
    pub retry_cooldown_seconds: i64,
}

impl PaymentPolicy {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            max_retries: config.payment_max_retries,
            retry_cooldown_seconds: config.payment_retry_cooldown_seconds,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub blobs: Arc<BlobStore>,
    pub clock: Arc<dyn Clock>,
    pub payment_policy: PaymentPolicy,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        blobs: Arc<BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let payment_policy = PaymentPolicy::from_app(&config);
        Self {
            config,
            store,
            blobs,
            clock,
            payment_policy,
        }
    }

    /// Production wiring: MongoDB when available, drive-backed blob store, wall clock.
    pub fn from_config(config: AppConfig, infra: Option<InfraClients>) -> Self {
        let store: Arc<dyn Store> = match infra {
            Some(infra) => Arc::new(MongoStore::new(infra)),
            None => {
                warn!("mongodb not configured; using in-memory store (data is not durable)");
                Arc::new(MemoryStore::new())
            }
        };
        let blobs = Arc::new(build_blob_store(&config));
        Self::new(config, store, blobs, Arc::new(SystemClock))
    }
}

pub fn build_blob_store(config: &AppConfig) -> BlobStore {
    let drive_settings = DriveSettings::from_app(config);
    let remote_folder = drive_settings.folder_id.clone();
    let remote: Option<Arc<dyn RemoteObjectStore>> = match DriveClient::new(drive_settings) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "drive client init failed; remote uploads disabled");
            None
        }
    };
    let local = Arc::new(DiskFileStore::new(&config.upload_root_dir));
    let settings = BlobStoreSettings {
        max_attempts: config.storage_max_attempts,
        backoff_base: Duration::from_millis(config.storage_backoff_base_ms),
        remote_folder,
        public_url_prefix: config.upload_public_prefix.clone(),
    };
    BlobStore::new(remote, local, settings)
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .with_state(state.clone())
        .merge(course_routes(state.clone()))
        .merge(enrollment_routes(state.clone()))
        .merge(payment_tracking_routes(state))
        .layer(cors)
}
