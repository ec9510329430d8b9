use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ledger entry for an accepted image hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Lowercase hex digest of the accepted file
    pub image_hash: String,
    /// Account address that uploaded it
    pub identity: String,
    /// Unix seconds at which it was accepted
    pub timestamp: i64,
}

/// Reference to a file persisted by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    /// Backend key, `uploads/{identity}/{hash}.{ext}`
    pub storage_key: String,
    /// Publicly resolvable URL of the file
    pub url: String,
}

/// Successful upload response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Always true
    pub success: bool,
    /// URL of the stored image
    pub image_url: String,
    /// SHA-256 digest of the stored bytes (lowercase hex)
    pub file_hash: String,
    /// Signature as submitted
    pub signature: String,
    /// Signed message as submitted
    pub message: String,
}
