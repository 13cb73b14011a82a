#![allow(dead_code)]

use async_trait::async_trait;
use course_pipeline::app::AppState;
use course_pipeline::config::environment::AppConfig;
use course_pipeline::module::course::crud as course_crud;
use course_pipeline::module::course::model::Course;
use course_pipeline::module::payment_tracking::model::{DEFAULT_MAX_RETRIES, RETRY_COOLDOWN_SECONDS};
use course_pipeline::module::course::schema::{
    CourseDraft, CourseMediaFiles, LessonDraft, ModuleDraft,
};
use course_pipeline::service::authz_service::{Actor, ActorRole};
use course_pipeline::service::clock_service::ManualClock;
use course_pipeline::service::drive_service::{RemoteObject, RemoteObjectStore};
use course_pipeline::service::local_disk_service::{DiskFileStore, LocalFileStore};
use course_pipeline::service::storage_service::{BlobStore, BlobStoreSettings, FileUpload};
use course_pipeline::store::Store;
use course_pipeline::store::memory::MemoryStore;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const START_TIME: i64 = 1_700_000_000;
pub const DAY: i64 = RETRY_COOLDOWN_SECONDS;

pub fn test_config(upload_root: &Path) -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        mongodb_url: None,
        mongodb_database: None,
        upload_root_dir: upload_root.display().to_string(),
        upload_public_prefix: "/uploads".to_string(),
        drive_access_token: None,
        drive_folder_id: None,
        drive_api_base_url: "http://127.0.0.1:9/drive/v3".to_string(),
        drive_upload_base_url: "http://127.0.0.1:9/upload/drive/v3".to_string(),
        drive_timeout_seconds: 1,
        storage_max_attempts: 3,
        storage_backoff_base_ms: 1,
        payment_max_retries: DEFAULT_MAX_RETRIES,
        payment_retry_cooldown_seconds: RETRY_COOLDOWN_SECONDS,
    }
}

pub fn fast_settings() -> BlobStoreSettings {
    BlobStoreSettings {
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
        remote_folder: Some("folder_01".to_string()),
        public_url_prefix: "/uploads".to_string(),
    }
}

/// Remote store whose behavior is scripted per test.
#[derive(Debug, Default)]
pub struct FlakyRemote {
    pub configured: bool,
    /// Number of leading `create` calls that fail.
    pub failures_before_success: u32,
    pub set_public_fails: bool,
    pub create_calls: AtomicU32,
    pub create_times: Mutex<Vec<Instant>>,
    pub set_public_calls: AtomicU32,
    pub deleted: Mutex<Vec<String>>,
}

impl FlakyRemote {
    pub fn healthy() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            configured: true,
            failures_before_success: failures,
            ..Self::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Time between consecutive `create` calls.
    pub fn create_gaps(&self) -> Vec<Duration> {
        let times = self.create_times.lock().expect("create times");
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

#[async_trait]
impl RemoteObjectStore for FlakyRemote {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create(
        &self,
        _bytes: &[u8],
        name: &str,
        _mime_type: &str,
        _parent_folder: Option<&str>,
    ) -> Result<RemoteObject, String> {
        self.create_times
            .lock()
            .map_err(|e| e.to_string())?
            .push(Instant::now());
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures_before_success {
            return Err(format!("scripted failure #{call}"));
        }
        let id = format!("remote-{call}-{name}");
        Ok(RemoteObject {
            url: format!("https://drive.example.test/{id}"),
            id,
        })
    }

    async fn set_public(&self, _id: &str) -> Result<(), String> {
        self.set_public_calls.fetch_add(1, Ordering::SeqCst);
        if self.set_public_fails {
            return Err("permission denied".to_string());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), String> {
        self.deleted
            .lock()
            .map_err(|e| e.to_string())?
            .push(id.to_string());
        Ok(())
    }
}

/// Local store that cannot write, standing in for a full or read-only disk.
#[derive(Debug)]
pub struct BrokenDisk {
    root: PathBuf,
}

impl BrokenDisk {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/nonexistent"),
        }
    }
}

#[async_trait]
impl LocalFileStore for BrokenDisk {
    async fn write(&self, _relative: &Path, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::StorageFull, "no space left on device"))
    }

    async fn delete(&self, _relative: &Path) -> io::Result<()> {
        Ok(())
    }

    async fn exists(&self, _relative: &Path) -> bool {
        false
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

pub struct Harness {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub upload_dir: TempDir,
}

impl Harness {
    pub fn upload_path(&self, local_id: &str) -> PathBuf {
        self.upload_dir.path().join(local_id)
    }
}

pub fn harness() -> Harness {
    harness_with(None, None, fast_settings(), Arc::new(MemoryStore::new()))
}

pub fn harness_with_remote(remote: Arc<FlakyRemote>) -> Harness {
    harness_with(Some(remote), None, fast_settings(), Arc::new(MemoryStore::new()))
}

pub fn harness_with_settings(remote: Arc<FlakyRemote>, settings: BlobStoreSettings) -> Harness {
    harness_with(Some(remote), None, settings, Arc::new(MemoryStore::new()))
}

pub fn harness_with_store(store: Arc<dyn Store>) -> Harness {
    harness_with(None, None, fast_settings(), store)
}

pub fn harness_with_broken_disk(remote: Option<Arc<FlakyRemote>>) -> Harness {
    let disk: Arc<dyn LocalFileStore> = Arc::new(BrokenDisk::new());
    harness_with(remote, Some(disk), fast_settings(), Arc::new(MemoryStore::new()))
}

fn harness_with(
    remote: Option<Arc<FlakyRemote>>,
    local: Option<Arc<dyn LocalFileStore>>,
    settings: BlobStoreSettings,
    store: Arc<dyn Store>,
) -> Harness {
    let upload_dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(upload_dir.path());
    let local: Arc<dyn LocalFileStore> = match local {
        Some(local) => local,
        None => Arc::new(DiskFileStore::new(upload_dir.path())),
    };
    let remote = remote.map(|r| r as Arc<dyn RemoteObjectStore>);
    let blobs = Arc::new(BlobStore::new(remote, local, settings));
    let clock = Arc::new(ManualClock::new(START_TIME));
    let state = AppState::new(config, store, blobs, clock.clone());
    Harness {
        state,
        clock,
        upload_dir,
    }
}

/// Files currently stored under one folder of the local upload root.
pub fn stored_files(h: &Harness, folder: &str) -> Vec<PathBuf> {
    match std::fs::read_dir(h.upload_dir.path().join(folder)) {
        Ok(entries) => entries
            .map(|entry| entry.expect("dir entry").path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn admin() -> Actor {
    Actor::new("admin-1", ActorRole::Admin)
}

pub fn instructor(id: &str) -> Actor {
    Actor::new(id, ActorRole::Instructor)
}

pub fn learner(id: &str) -> Actor {
    Actor::new(id, ActorRole::Learner)
}

pub fn png(name: &str) -> FileUpload {
    FileUpload::new(name, "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
}

pub fn mp4(name: &str) -> FileUpload {
    FileUpload::new(name, "video/mp4", vec![0, 0, 0, 0x18, b'f', b't', b'y', b'p'])
}

pub fn pdf(name: &str) -> FileUpload {
    FileUpload::new(name, "application/pdf", b"%PDF-1.7 test".to_vec())
}

pub fn draft(title: &str, price: i64) -> CourseDraft {
    CourseDraft {
        title: title.to_string(),
        description: "An introduction".to_string(),
        category: Some("programming".to_string()),
        level: Some("beginner".to_string()),
        language: Some("en".to_string()),
        price,
        published: false,
        intro_video_link: None,
        modules: vec![ModuleDraft {
            title: "Basics".to_string(),
            lessons: vec![
                LessonDraft {
                    title: "Ownership".to_string(),
                    video_link: Some("https://youtu.be/ownership01".to_string()),
                },
                LessonDraft {
                    title: "Borrowing".to_string(),
                    video_link: None,
                },
            ],
        }],
        owner_id: None,
    }
}

pub async fn seed_course(h: &Harness, owner: &Actor, price: i64) -> Course {
    course_crud::create_course(
        &h.state,
        owner,
        draft("Rust 101", price),
        CourseMediaFiles::default(),
        None,
    )
    .await
    .expect("seed course")
    .course
}

pub fn lesson_id(course: &Course, title: &str) -> String {
    course
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .find(|l| l.title == title)
        .map(|l| l.id.clone())
        .expect("lesson present")
}
