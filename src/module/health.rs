use crate::app::AppState;
use crate::service::metrics_service::{self, MetricsSnapshot};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_backend: String,
    pub store_durable: bool,
    pub remote_storage_ready: bool,
    pub metrics: MetricsSnapshot,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            store_backend: state.store.backend_name().to_string(),
            store_durable: state.store.is_durable(),
            remote_storage_ready: state.blobs.remote_ready(),
            metrics: metrics_service::snapshot(),
        }),
    )
}
