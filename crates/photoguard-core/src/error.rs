//! Error types module
//!
//! All rejections the upload guard can produce, plus the generic request and
//! infrastructure failures of the HTTP service, are unified under `AppError`.
//! Each variant self-describes its HTTP status, machine code, retry hint and log level
//! through the `ErrorMetadata` trait so the API layer renders them uniformly.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like malformed input
    Debug,
    /// Info level - for benign rejections such as idempotent duplicates
    Info,
    /// Warning level - for security events
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "HASH_MISMATCH")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client, rendered as `hint`
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Message timestamp {timestamp} outside freshness window (now {now})")]
    TimestampExpired { timestamp: i64, now: i64 },

    #[error("Hash mismatch: message declares {declared}, file hashes to {computed}")]
    HashMismatch { declared: String, computed: String },

    #[error("Identity mismatch: request claims {claimed}, message signed for {signed}")]
    IdentityMismatch { claimed: String, signed: String },

    #[error("Duplicate upload: {0}")]
    DuplicateUpload(String),

    #[error("Duplicate content: {0}")]
    DuplicateContent(String),

    #[error("Device mismatch: declared {declared}, signed {signed}")]
    DeviceMismatch { declared: String, signed: String },

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Content rejected: {0}")]
    ContentRejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::MissingInput(_) => (
            400,
            "MISSING_INPUT",
            true,
            Some("Provide file, signature, publicKey, message and userAddress"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedMessage(_) => (
            400,
            "MALFORMED_MESSAGE",
            false,
            Some("Message must be upload_image:<hash>[:<deviceId>]:<timestamp>:<address>"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidSignature(_) => (
            401,
            "INVALID_SIGNATURE",
            false,
            Some("Sign the exact message bytes with the key matching publicKey"),
            false,
            LogLevel::Warn,
        ),
        AppError::TimestampExpired { .. } => (
            401,
            "TIMESTAMP_EXPIRED",
            true,
            Some("Sign a fresh message and retry; signatures are valid for 5 minutes"),
            false,
            LogLevel::Info,
        ),
        AppError::HashMismatch { .. } => (
            401,
            "HASH_MISMATCH",
            false,
            Some("Hash the exact file being uploaded and sign that digest"),
            false,
            LogLevel::Warn,
        ),
        AppError::IdentityMismatch { .. } => (
            401,
            "IDENTITY_MISMATCH",
            false,
            Some("userAddress must match the address inside the signed message"),
            false,
            LogLevel::Warn,
        ),
        AppError::DuplicateUpload(_) => (
            409,
            "DUPLICATE_UPLOAD",
            false,
            Some("This image was already uploaded by this address"),
            false,
            LogLevel::Info,
        ),
        AppError::DuplicateContent(_) => (
            409,
            "DUPLICATE_CONTENT",
            false,
            Some("This image was already uploaded by another address"),
            false,
            LogLevel::Info,
        ),
        AppError::DeviceMismatch { .. } => (
            401,
            "DEVICE_MISMATCH",
            false,
            Some("deviceId must match the device id inside the signed message"),
            false,
            LogLevel::Warn,
        ),
        AppError::StorageFailure(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::ContentRejected(_) => (
            422,
            "CONTENT_REJECTED",
            false,
            Some("Upload a different photo"),
            false,
            LogLevel::Info,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the file reference"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingInput(_) => "MissingInput",
            AppError::MalformedMessage(_) => "MalformedMessage",
            AppError::InvalidSignature(_) => "InvalidSignature",
            AppError::TimestampExpired { .. } => "TimestampExpired",
            AppError::HashMismatch { .. } => "HashMismatch",
            AppError::IdentityMismatch { .. } => "IdentityMismatch",
            AppError::DuplicateUpload(_) => "DuplicateUpload",
            AppError::DuplicateContent(_) => "DuplicateContent",
            AppError::DeviceMismatch { .. } => "DeviceMismatch",
            AppError::StorageFailure(_) => "StorageFailure",
            AppError::ContentRejected(_) => "ContentRejected",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Rejections that indicate a forged or tampered request rather than a client mistake.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            AppError::InvalidSignature(_)
                | AppError::HashMismatch { .. }
                | AppError::IdentityMismatch { .. }
                | AppError::DeviceMismatch { .. }
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingInput(ref field) => format!("Missing required field: {}", field),
            AppError::MalformedMessage(_) => "Malformed upload message".to_string(),
            AppError::InvalidSignature(_) => "Invalid signature".to_string(),
            AppError::TimestampExpired { .. } => "Signed message has expired".to_string(),
            AppError::HashMismatch { .. } => {
                "File hash does not match the signed message".to_string()
            }
            AppError::IdentityMismatch { .. } => {
                "Address does not match the signed message".to_string()
            }
            AppError::DuplicateUpload(_) => "Image already uploaded".to_string(),
            AppError::DuplicateContent(_) => {
                "Image already uploaded by another address".to_string()
            }
            AppError::DeviceMismatch { .. } => {
                "Device does not match the signed message".to_string()
            }
            AppError::StorageFailure(_) => "Failed to store file".to_string(),
            AppError::ContentRejected(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
