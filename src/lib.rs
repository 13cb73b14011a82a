pub mod app;
pub mod config;
pub mod error;
pub mod infra;
pub mod module;
pub mod service;
pub mod store;
