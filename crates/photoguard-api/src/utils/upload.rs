//! Multipart extraction and request-level file validation for uploads

use crate::error::HttpAppError;
use axum::extract::Multipart;
use photoguard_core::AppError;

/// The `file` part of an upload form.
#[derive(Debug)]
pub struct FilePart {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Raw multipart fields of an upload request; unknown fields are ignored.
#[derive(Debug, Default)]
pub struct UploadFields {
    pub file: Option<FilePart>,
    pub signature: Option<String>,
    pub public_key: Option<String>,
    pub message: Option<String>,
    pub identity: Option<String>,
    pub device_id: Option<String>,
}

impl UploadFields {
    /// Name of the first required field that is absent or blank.
    pub fn first_missing(&self) -> Option<&'static str> {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().map_or(true, |v| v.trim().is_empty())
        }

        if self.file.as_ref().map_or(true, |f| f.data.is_empty()) {
            Some("file")
        } else if blank(&self.signature) {
            Some("signature")
        } else if blank(&self.public_key) {
            Some("publicKey")
        } else if blank(&self.message) {
            Some("message")
        } else if blank(&self.identity) {
            Some("userAddress")
        } else {
            None
        }
    }
}

/// Read every field of the form. Exactly one `file` part is accepted.
pub async fn extract_upload_fields(mut multipart: Multipart) -> Result<UploadFields, HttpAppError> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match name.as_str() {
            "file" => {
                if fields.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    )
                    .into());
                }
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await?;
                fields.file = Some(FilePart {
                    data: data.to_vec(),
                    filename,
                    content_type,
                });
            }
            "signature" => fields.signature = Some(field.text().await?),
            "publicKey" => fields.public_key = Some(field.text().await?),
            "message" => fields.message = Some(field.text().await?),
            "userAddress" | "identity" => {
                let value = field.text().await?;
                if fields.identity.is_none() {
                    fields.identity = Some(value);
                }
            }
            "deviceId" => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    fields.device_id = Some(value);
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(fields)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; q=1" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Validate content type against allowlist. Returns the normalized type.
pub fn validate_content_type(
    content_type: &str,
    allowed_types: &[String],
) -> Result<String, AppError> {
    let normalized = normalize_mime_type(content_type);
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }
    Ok(normalized)
}

/// Extension implied by an image MIME type.
fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Validate file extension, taken from the filename or, failing that, the content type.
pub fn resolve_extension(
    filename: Option<&str>,
    content_type: &str,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let from_name = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty());

    let extension = match from_name {
        Some(ext) => ext,
        None => extension_for_content_type(content_type)
            .map(str::to_string)
            .unwrap_or_default(),
    };

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}
