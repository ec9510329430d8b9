//! Photoguard Core Library
//!
//! This crate provides the error types, configuration, constants and shared models
//! used by every Photoguard component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, CrossIdentityPolicy, GuardConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{StoredFile, UploadReceipt, UploadRecord};
pub use storage_types::StorageBackend;
