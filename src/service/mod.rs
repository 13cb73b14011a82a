pub mod audit_service;
pub mod authz_service;
pub mod clock_service;
pub mod drive_service;
pub mod local_disk_service;
pub mod metrics_service;
pub mod storage_service;
pub mod video_link_service;
