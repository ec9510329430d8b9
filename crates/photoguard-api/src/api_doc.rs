//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use photoguard_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photoguard API",
        version = "0.1.0",
        description = "Authenticated photo uploads. Each upload carries an Ed25519 signature over a message binding the file hash, the uploader address and a timestamp."
    ),
    paths(
        handlers::upload::upload_image,
        handlers::files::serve_file,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadReceipt,
            handlers::upload::UploadForm,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Signed photo upload and retrieval"),
        (name = "health", description = "Service health checks")
    )
)]
pub struct ApiDoc;
