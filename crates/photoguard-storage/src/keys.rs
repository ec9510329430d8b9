//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{owner}/{filename}`.

use crate::{StorageError, StorageResult};
use photoguard_core::constants::UPLOADS_PREFIX;

const MAX_SEGMENT_LENGTH: usize = 128;

/// Check that a single path segment (identity or filename) cannot escape its directory.
///
/// Only ASCII alphanumerics, `-`, `_` and `.` are accepted, the segment may not start
/// with a dot, and it is bounded in length.
pub fn validate_path_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty() || segment.len() > MAX_SEGMENT_LENGTH {
        return Err(StorageError::InvalidKey(format!(
            "Path segment must be 1-{} characters",
            MAX_SEGMENT_LENGTH
        )));
    }
    if segment.starts_with('.') {
        return Err(StorageError::InvalidKey(
            "Path segment must not start with '.'".to_string(),
        ));
    }
    if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(StorageError::InvalidKey(
            "Path segment contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Generate the storage key for an owner's file.
pub fn generate_storage_key(owner: &str, filename: &str) -> StorageResult<String> {
    validate_path_segment(owner)?;
    validate_path_segment(filename)?;
    Ok(format!("{}/{}/{}", UPLOADS_PREFIX, owner, filename))
}

/// Filename of a stored upload: the content hash plus the original extension.
pub fn stored_filename(image_hash: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.').to_lowercase();
    if extension.is_empty() {
        image_hash.to_string()
    } else {
        format!("{}.{}", image_hash, extension)
    }
}

/// Reject keys that could resolve outside the storage root.
pub(crate) fn check_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if storage_key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
