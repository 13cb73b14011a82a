use crate::config::environment::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: String,
    pub url: String,
}

/// Remote drive-style object store.
///
/// `is_configured` is a cheap synchronous probe; the BlobStore evaluates it once at
/// construction and never calls the network when it reports `false`.
#[async_trait]
pub trait RemoteObjectStore: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn create(
        &self,
        bytes: &[u8],
        name: &str,
        mime_type: &str,
        parent_folder: Option<&str>,
    ) -> Result<RemoteObject, String>;

    async fn set_public(&self, id: &str) -> Result<(), String>;

    async fn delete(&self, id: &str) -> Result<(), String>;
}

#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub access_token: Option<String>,
    pub folder_id: Option<String>,
    pub api_base_url: String,
    pub upload_base_url: String,
    pub timeout_seconds: u64,
}

impl DriveSettings {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            access_token: config.drive_access_token.clone(),
            folder_id: config.drive_folder_id.clone(),
            api_base_url: config.drive_api_base_url.clone(),
            upload_base_url: config.drive_upload_base_url.clone(),
            timeout_seconds: config.drive_timeout_seconds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Client,
    settings: DriveSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileResponse {
    id: String,
    web_view_link: Option<String>,
}

impl DriveClient {
    pub fn new(settings: DriveSettings) -> Result<Self, String> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds.max(1)))
            .build()
            .map_err(|e| format!("failed to build http client: {e}"))?;
        Ok(Self { http, settings })
    }

    pub fn default_folder(&self) -> Option<&str> {
        self.settings.folder_id.as_deref()
    }

    fn token(&self) -> Result<&str, String> {
        self.settings
            .access_token
            .as_deref()
            .ok_or_else(|| "drive access token is not configured".to_string())
    }
}

#[async_trait]
impl RemoteObjectStore for DriveClient {
    fn is_configured(&self) -> bool {
        let token_ok = self
            .settings
            .access_token
            .as_deref()
            .map(|t| !t.is_empty() && !t.chars().any(char::is_whitespace))
            .unwrap_or(false);
        let folder_ok = self
            .settings
            .folder_id
            .as_deref()
            .map(|f| {
                !f.is_empty()
                    && f.chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            })
            .unwrap_or(false);
        token_ok && folder_ok
    }

    async fn create(
        &self,
        bytes: &[u8],
        name: &str,
        mime_type: &str,
        parent_folder: Option<&str>,
    ) -> Result<RemoteObject, String> {
        let token = self.token()?;
        let parent = parent_folder.or(self.default_folder());
        let metadata = match parent {
            Some(folder) => json!({ "name": name, "parents": [folder] }),
            None => json!({ "name": name }),
        };
        let metadata = serde_json::to_vec(&metadata)
            .map_err(|e| format!("drive metadata encode failed: {e}"))?;

        let boundary = format!("boundary-{}", Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &metadata, bytes, mime_type);
        let endpoint = format!(
            "{}/files?uploadType=multipart&fields=id,webViewLink",
            self.settings.upload_base_url.trim_end_matches('/')
        );

        let resp = self
            .http
            .post(endpoint)
            .bearer_auth(token)
            .header(
                "content-type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| format!("drive upload request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!(
                "drive upload returned non-success status: {}",
                resp.status()
            ));
        }

        let file = resp
            .json::<DriveFileResponse>()
            .await
            .map_err(|e| format!("failed to parse drive upload payload: {e}"))?;
        let url = file
            .web_view_link
            .unwrap_or_else(|| format!("https://drive.google.com/uc?export=view&id={}", file.id));
        Ok(RemoteObject { id: file.id, url })
    }

    async fn set_public(&self, id: &str) -> Result<(), String> {
        let token = self.token()?;
        let endpoint = format!(
            "{}/files/{id}/permissions",
            self.settings.api_base_url.trim_end_matches('/')
        );
        let resp = self
            .http
            .post(endpoint)
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| format!("drive permission request failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!(
                "drive permission returned non-success status: {}",
                resp.status()
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), String> {
        let token = self.token()?;
        let endpoint = format!(
            "{}/files/{id}",
            self.settings.api_base_url.trim_end_matches('/')
        );
        let resp = self
            .http
            .delete(endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("drive delete request failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!(
                "drive delete returned non-success status: {}",
                resp.status()
            ));
        }
        Ok(())
    }
}

fn multipart_related_body(boundary: &str, metadata: &[u8], bytes: &[u8], mime_type: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
