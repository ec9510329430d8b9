//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; any `AppError` converts with `?`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use photoguard_core::{AppError, ErrorMetadata, LogLevel};
use photoguard_storage::StorageError;

pub use photoguard_infra::ErrorResponse;

/// Wrapper type for AppError to implement IntoResponse
///
/// Needed because of the orphan rule: IntoResponse (axum) cannot be implemented
/// for AppError (photoguard-core) outside either crate.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg) => AppError::StorageFailure(msg),
            StorageError::IoError(err) => AppError::StorageFailure(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
        } else {
            AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError, status: StatusCode) {
    let error_type = error.error_type();
    let status = status.as_u16();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, status, "Request failed");
        }
        LogLevel::Info => {
            tracing::info!(error = %error, error_type, status, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, status, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, status, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the response body for `error`. Details are withheld in production and for
/// sensitive errors.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorResponse {
    let details = if is_production || error.is_sensitive() {
        None
    } else {
        Some(error.detailed_message())
    };

    ErrorResponse {
        error: error.client_message(),
        hint: error.suggested_action().map(String::from),
        code: error.error_code().to_string(),
        details,
        recoverable: error.is_recoverable(),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error, status);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}
