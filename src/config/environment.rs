use crate::module::payment_tracking::model::{DEFAULT_MAX_RETRIES, RETRY_COOLDOWN_SECONDS};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub mongodb_url: Option<String>,
    pub mongodb_database: Option<String>,
    pub upload_root_dir: String,
    pub upload_public_prefix: String,
    pub drive_access_token: Option<String>,
    pub drive_folder_id: Option<String>,
    pub drive_api_base_url: String,
    pub drive_upload_base_url: String,
    pub drive_timeout_seconds: u64,
    pub storage_max_attempts: u32,
    pub storage_backoff_base_ms: u64,
    pub payment_max_retries: u32,
    pub payment_retry_cooldown_seconds: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            mongodb_url: read_optional_var("MONGODB_URL"),
            mongodb_database: read_optional_var("MONGODB_DATABASE"),
            upload_root_dir: read_optional_string("UPLOAD_ROOT_DIR", "uploads"),
            upload_public_prefix: read_optional_string("UPLOAD_PUBLIC_PREFIX", "/uploads"),
            drive_access_token: read_optional_var("DRIVE_ACCESS_TOKEN"),
            drive_folder_id: read_optional_var("DRIVE_FOLDER_ID"),
            drive_api_base_url: read_optional_string(
                "DRIVE_API_BASE_URL",
                "https://www.googleapis.com/drive/v3",
            ),
            drive_upload_base_url: read_optional_string(
                "DRIVE_UPLOAD_BASE_URL",
                "https://www.googleapis.com/upload/drive/v3",
            ),
            drive_timeout_seconds: read_optional_u64("DRIVE_TIMEOUT_SECONDS", 30)?,
            storage_max_attempts: read_optional_u32("STORAGE_MAX_ATTEMPTS", 3)?,
            storage_backoff_base_ms: read_optional_u64("STORAGE_BACKOFF_BASE_MS", 1000)?,
            payment_max_retries: read_optional_u32("PAYMENT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            payment_retry_cooldown_seconds: read_optional_i64(
                "PAYMENT_RETRY_COOLDOWN_SECONDS",
                RETRY_COOLDOWN_SECONDS,
            )?,
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_optional_i64(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<i64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_u32(key: &str, default: u32) -> Result<u32, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u32>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
