use crate::error::CoreError;
use crate::service::drive_service::RemoteObjectStore;
use crate::service::local_disk_service::LocalFileStore;
use crate::service::metrics_service;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_LOCAL_FOLDER: &str = "misc";

/// An uploaded file as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self {
            bytes,
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

/// JSON transport shape for a file: base64 body plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePayload {
    pub name: String,
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    pub data_base64: String,
}

impl FilePayload {
    pub fn decode(&self) -> Result<FileUpload, CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("file name is required".to_string()));
        }
        let bytes = STANDARD.decode(self.data_base64.trim()).map_err(|e| {
            CoreError::Validation(format!("file {} is not valid base64: {e}", self.name))
        })?;
        Ok(FileUpload::new(self.name.clone(), self.mime_type.clone(), bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Remote,
    Local,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Uniform result of an upload. `storage_type` records where the bytes actually live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    pub id: String,
    pub url: String,
    pub storage_type: StorageType,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("remote upload failed: {0}")]
    Transient(String),

    #[error("local storage failed: {0}")]
    Fatal(String),
}

#[derive(Debug, Clone)]
pub struct BlobStoreSettings {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub remote_folder: Option<String>,
    pub public_url_prefix: String,
}

impl Default for BlobStoreSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            remote_folder: None,
            public_url_prefix: "/uploads".to_string(),
        }
    }
}

pub struct BlobStore {
    remote: Option<Arc<dyn RemoteObjectStore>>,
    remote_ready: bool,
    local: Arc<dyn LocalFileStore>,
    settings: BlobStoreSettings,
}

impl BlobStore {
    /// Probes the remote client exactly once; the outcome is kept for the lifetime of the store.
    pub fn new(
        remote: Option<Arc<dyn RemoteObjectStore>>,
        local: Arc<dyn LocalFileStore>,
        settings: BlobStoreSettings,
    ) -> Self {
        let remote_ready = remote.as_ref().map(|r| r.is_configured()).unwrap_or(false);
        if !remote_ready {
            warn!(
                root = %local.root().display(),
                "remote object store not configured; uploads go to local disk"
            );
        }
        Self {
            remote,
            remote_ready,
            local,
            settings,
        }
    }

    pub fn remote_ready(&self) -> bool {
        self.remote_ready
    }

    pub async fn upload(
        &self,
        file: &FileUpload,
        folder_hint: &str,
    ) -> Result<UploadDescriptor, StorageError> {
        if let Some(remote) = self.remote.as_ref().filter(|_| self.remote_ready) {
            match self.upload_remote(remote.as_ref(), file).await {
                Ok(descriptor) => return Ok(descriptor),
                Err(e) => {
                    warn!(
                        file = %file.name,
                        folder = %folder_hint,
                        error = %e,
                        "remote upload exhausted; falling back to local disk"
                    );
                    metrics_service::inc_local_fallbacks();
                }
            }
        }
        self.upload_local(file, folder_hint).await
    }

    async fn upload_remote(
        &self,
        remote: &dyn RemoteObjectStore,
        file: &FileUpload,
    ) -> Result<UploadDescriptor, StorageError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match remote
                .create(
                    &file.bytes,
                    &file.name,
                    &file.mime_type,
                    self.settings.remote_folder.as_deref(),
                )
                .await
            {
                Ok(object) => {
                    if let Err(e) = remote.set_public(&object.id).await {
                        warn!(file_id = %object.id, error = %e, "failed to mark upload public");
                    }
                    metrics_service::inc_remote_uploads();
                    info!(file_id = %object.id, attempt, "remote upload stored");
                    return Ok(UploadDescriptor {
                        id: object.id,
                        url: object.url,
                        storage_type: StorageType::Remote,
                        name: file.name.clone(),
                        mime_type: file.mime_type.clone(),
                        size: file.size,
                    });
                }
                Err(e) => {
                    metrics_service::inc_remote_attempt_failures();
                    warn!(file = %file.name, attempt, max_attempts, error = %e, "remote upload attempt failed");
                    last_error = e;
                    if attempt < max_attempts {
                        sleep(self.backoff_for(attempt)).await;
                    }
                }
            }
        }

        Err(StorageError::Transient(last_error))
    }

    async fn upload_local(
        &self,
        file: &FileUpload,
        folder_hint: &str,
    ) -> Result<UploadDescriptor, StorageError> {
        let folder = safe_folder(folder_hint);
        let filename = local_filename(&file.name);
        let relative = PathBuf::from(folder).join(&filename);

        self.local
            .write(&relative, &file.bytes)
            .await
            .map_err(|e| StorageError::Fatal(format!("write {}: {e}", relative.display())))?;

        info!(folder, filename = %filename, "upload stored on local disk");
        Ok(UploadDescriptor {
            id: format!("{folder}/{filename}"),
            url: format!(
                "{}/{folder}/{filename}",
                self.settings.public_url_prefix.trim_end_matches('/')
            ),
            storage_type: StorageType::Local,
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
        })
    }

    /// Best-effort removal; failures are logged and reported as `false`.
    pub async fn delete(&self, descriptor: &UploadDescriptor) -> bool {
        match descriptor.storage_type {
            StorageType::Local => {
                let Some(relative) = local_path_from_id(&descriptor.id) else {
                    warn!(id = %descriptor.id, "refusing to delete malformed local id");
                    return false;
                };
                match self.local.delete(&relative).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(id = %descriptor.id, error = %e, "local delete failed");
                        false
                    }
                }
            }
            StorageType::Remote => {
                let Some(remote) = &self.remote else {
                    warn!(id = %descriptor.id, "remote delete requested without a remote client");
                    return false;
                };
                match remote.delete(&descriptor.id).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(id = %descriptor.id, error = %e, "remote delete failed");
                        false
                    }
                }
            }
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.settings.backoff_base * 2u32.saturating_pow(attempt)
    }
}

/// Restricts the destination folder to `[a-zA-Z0-9_-]+`; anything else maps to the default.
pub fn safe_folder(hint: &str) -> &str {
    let valid = !hint.is_empty()
        && hint
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid { hint } else { DEFAULT_LOCAL_FOLDER }
}

pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

fn local_filename(original: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8],
        sanitize_filename(original)
    )
}

fn local_path_from_id(id: &str) -> Option<PathBuf> {
    let (folder, filename) = id.split_once('/')?;
    if safe_folder(folder) != folder || sanitize_filename(filename) != filename {
        return None;
    }
    Some(PathBuf::from(folder).join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_folder_coerces_traversal_attempts() {
        assert_eq!(safe_folder("thumbnails"), "thumbnails");
        assert_eq!(safe_folder("payment-proofs_2"), "payment-proofs_2");
        assert_eq!(safe_folder("../etc"), DEFAULT_LOCAL_FOLDER);
        assert_eq!(safe_folder("a/b"), DEFAULT_LOCAL_FOLDER);
        assert_eq!(safe_folder(".."), DEFAULT_LOCAL_FOLDER);
        assert_eq!(safe_folder(""), DEFAULT_LOCAL_FOLDER);
    }

    #[test]
    fn sanitize_filename_strips_directories_and_symbols() {
        assert_eq!(sanitize_filename("../../secret.pdf"), "secret.pdf");
        assert_eq!(sanitize_filename("my cover (1).png"), "my_cover__1_.png");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn local_ids_must_round_trip_through_sanitizers() {
        assert!(local_path_from_id("thumbnails/1-abc-cover.png").is_some());
        assert!(local_path_from_id("../x/cover.png").is_none());
        assert!(local_path_from_id("thumbnails/../../x").is_none());
        assert!(local_path_from_id("no-slash").is_none());
    }
}
