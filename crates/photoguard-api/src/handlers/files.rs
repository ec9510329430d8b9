use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use photoguard_core::AppError;
use photoguard_storage::{generate_storage_key, StorageError};

use crate::constants::FILE_CACHE_CONTROL;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Serve a stored upload
#[utoipa::path(
    get,
    path = "/uploads/{identity}/{filename}",
    tag = "uploads",
    params(
        ("identity" = String, Path, description = "Uploader address"),
        ("filename" = String, Path, description = "Stored filename, `<sha256>.<ext>`")
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = ErrorResponse)
    )
)]
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path((identity, filename)): Path<(String, String)>,
) -> Result<Response, HttpAppError> {
    // Keys that could never have been written are reported as missing
    let key = generate_storage_key(&identity, &filename)
        .map_err(|_| AppError::NotFound(format!("{}/{}", identity, filename)))?;

    let data = match state.storage.download(&key).await {
        Ok(data) => data,
        Err(StorageError::NotFound(_)) => return Err(AppError::NotFound(key).into()),
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&filename)),
            (header::CACHE_CONTROL, FILE_CACHE_CONTROL),
        ],
        data,
    )
        .into_response())
}
