pub mod course;
pub mod enrollment;
pub mod error;
pub mod health;
pub mod payment_tracking;
