//! HTTP error response body
//!
//! The `IntoResponse` conversion for `AppError` lives in photoguard-api: the orphan
//! rule forbids implementing axum's trait for a core type here.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable description
    pub error: String,
    /// What the client can do about it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Machine-readable error code, e.g. `HASH_MISMATCH`
    pub code: String,
    /// Internal detail, only outside production and only for non-sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Whether retrying the same request can succeed
    pub recoverable: bool,
}
