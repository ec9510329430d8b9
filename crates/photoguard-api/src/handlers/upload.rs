use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use photoguard_core::{AppError, UploadReceipt};
use photoguard_guard::{check_content, UploadRequest};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{
    extract_upload_fields, resolve_extension, validate_content_type, validate_file_size,
};

/// Multipart body of an upload
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadForm {
    /// Image bytes
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Hex Ed25519 signature over `message`, optional 0x prefix
    signature: String,
    /// Hex Ed25519 public key, optional 0x prefix
    public_key: String,
    /// `upload_image:<hash>[:<deviceId>]:<timestamp>:<address>`
    message: String,
    /// Uploader address; `identity` is accepted as an alias
    user_address: String,
    /// Device fingerprint, checked against the signed one when both are present
    device_id: Option<String>,
}

/// Upload a signed photo
///
/// The file is stored only if the signature verifies, the message is fresh, its
/// hash matches the file and the address has not uploaded this image before.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "uploads",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload accepted and stored", body = UploadReceipt),
        (status = 400, description = "Missing field, malformed message or invalid file", body = ErrorResponse),
        (status = 401, description = "Signature, timestamp, hash, address or device check failed", body = ErrorResponse),
        (status = 409, description = "Image already uploaded", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Rejected by content classifier", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadReceipt>, HttpAppError> {
    let fields = extract_upload_fields(multipart).await?;

    if let Some(field) = fields.first_missing() {
        return Err(AppError::MissingInput(field.to_string()).into());
    }

    let (
        Some(file),
        Some(signature),
        Some(public_key),
        Some(message),
        Some(identity),
    ) = (
        fields.file,
        fields.signature,
        fields.public_key,
        fields.message,
        fields.identity,
    )
    else {
        return Err(AppError::Internal("upload fields vanished after validation".to_string()).into());
    };

    let limits = &state.limits;
    validate_file_size(file.data.len(), limits.max_file_size)?;

    let content_type = validate_content_type(
        file.content_type.as_deref().unwrap_or("application/octet-stream"),
        &limits.allowed_content_types,
    )?;
    let extension = resolve_extension(
        file.filename.as_deref(),
        &content_type,
        &limits.allowed_extensions,
    )?;

    if let Some(moderator) = &state.moderator {
        check_content(moderator.as_ref(), &file.data, &content_type).await?;
    }

    let mut request = UploadRequest::new(
        file.data,
        signature.trim(),
        public_key.trim(),
        message,
        identity.trim(),
    )
    .with_file_type(extension, content_type);
    if let Some(device_id) = fields.device_id {
        request = request.with_device_id(device_id);
    }

    let accepted = state.guard.process(request).await?;

    Ok(Json(accepted.into_receipt()))
}
