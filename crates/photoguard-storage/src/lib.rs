//! Photoguard Storage Library
//!
//! This crate provides the storage abstraction the upload guard writes accepted
//! files through, with a local filesystem backend and an in-memory backend.
//!
//! # Storage key format
//!
//! Keys are identity-scoped: `uploads/{identity}/{filename}`, where the filename
//! is derived from the content hash. Keys must not contain `..` or a leading `/`;
//! generation and validation live in the `keys` module so all backends agree.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_storage_key, stored_filename, validate_path_segment};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use photoguard_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
