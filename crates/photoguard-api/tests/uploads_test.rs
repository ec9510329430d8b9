//! Upload API integration tests.
//!
//! Run with: `cargo test -p photoguard-api --test uploads_test`

mod helpers;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{api_path, setup_test_app, setup_test_app_with, upload_form, upload_form_named};
use photoguard_core::{AppError, CrossIdentityPolicy};
use photoguard_guard::{digest, ContentModerator, ModerationVerdict, UploadLedger};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_upload_image() {
    let app = setup_test_app().await;
    let request = app.signed(b"test-image", "0xABC", None).await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let hash = digest(b"test-image");
    assert_eq!(body["success"], true);
    assert_eq!(body["fileHash"], hash.as_str());
    assert_eq!(body["message"], request.message.as_str());
    assert_eq!(body["signature"], request.signature.as_str());
    assert_eq!(
        body["imageUrl"],
        format!("http://localhost:4000/uploads/0xABC/{}.jpg", hash).as_str()
    );
    assert!(response.maybe_header("X-Request-ID").is_some());
}

#[tokio::test]
async fn test_uploaded_file_is_served() {
    let app = setup_test_app().await;
    let png = helpers::fixtures::create_minimal_png();
    let request = app.signed(&png, "0xABC", None).await;

    app.client()
        .post(&api_path("/uploads"))
        .multipart(upload_form_named(&request, "capture.png", "image/png"))
        .await
        .assert_status_ok();

    let response = app
        .client()
        .get(&format!("/uploads/0xABC/{}.png", digest(&png)))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.as_bytes().to_vec(), png);
}

#[tokio::test]
async fn test_serving_unknown_file_is_not_found() {
    let app = setup_test_app().await;

    let response = app.client().get("/uploads/0xABC/missing.jpg").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app.client().get("/uploads/0xABC/.hidden").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_identity_alias_field() {
    let app = setup_test_app().await;
    let request = app.signed(b"alias", "0xABC", None).await;

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(request.file_bytes.clone())
                .file_name("a.jpg")
                .mime_type("image/jpeg"),
        )
        .add_text("signature", request.signature.clone())
        .add_text("publicKey", request.public_key.clone())
        .add_text("message", request.message.clone())
        .add_text("identity", request.identity.clone());

    app.client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_missing_field() {
    let app = setup_test_app().await;
    let request = app.signed(b"test-image", "0xABC", None).await;

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(request.file_bytes.clone())
                .file_name("a.jpg")
                .mime_type("image/jpeg"),
        )
        .add_text("publicKey", request.public_key.clone())
        .add_text("message", request.message.clone())
        .add_text("userAddress", request.identity.clone());

    let response = app.client().post(&api_path("/uploads")).multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "MISSING_INPUT");
    assert!(body["error"].as_str().unwrap().contains("signature"));
}

#[tokio::test]
async fn test_invalid_signature() {
    let app = setup_test_app().await;
    let mut request = app.signed(b"test-image", "0xABC", None).await;
    request.signature = "00".repeat(64);

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert_eq!(body["recoverable"], false);
    assert!(body["hint"].is_string());
}

#[tokio::test]
async fn test_replay_ten_minutes_later() {
    let app = setup_test_app().await;
    let request = app.signed(b"test-image", "0xABC", None).await;

    app.clock.advance(600);
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "TIMESTAMP_EXPIRED");
}

#[tokio::test]
async fn test_hash_mismatch() {
    let app = setup_test_app().await;
    let mut request = app.signed(b"declared", "0xABC", None).await;
    request.file_bytes = b"actual".to_vec();

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "HASH_MISMATCH");
}

#[tokio::test]
async fn test_duplicate_upload() {
    let app = setup_test_app().await;
    let request = app.signed(b"test-image", "0xABC", None).await;

    app.client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await
        .assert_status_ok();

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "DUPLICATE_UPLOAD");

    let other = app.signed(b"test-image", "0xDEF", None).await;
    app.client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&other))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_cross_identity_reject_policy() {
    let app = setup_test_app_with(
        |config| config.cross_identity_policy = CrossIdentityPolicy::Reject,
        None,
    )
    .await;

    let first = app.signed(b"test-image", "0xABC", None).await;
    app.client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&first))
        .await
        .assert_status_ok();

    let second = app.signed(b"test-image", "0xDEF", None).await;
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&second))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "DUPLICATE_CONTENT");
}

#[tokio::test]
async fn test_device_mismatch() {
    let app = setup_test_app().await;
    let mut request = app.signed(b"test-image", "0xABC", Some("pixel-8")).await;
    request.device_id = Some("iphone-15".to_string());

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "DEVICE_MISMATCH");
}

#[tokio::test]
async fn test_invalid_extension() {
    let app = setup_test_app().await;
    let request = app.signed(b"test-image", "0xABC", None).await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form_named(&request, "photo.gif", "image/jpeg"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_file_too_large() {
    let app = setup_test_app_with(|config| config.max_file_size_bytes = 16, None).await;
    let request = app.signed(&[0u8; 64], "0xABC", None).await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

struct RejectAll;

#[async_trait]
impl ContentModerator for RejectAll {
    async fn classify(&self, _: &[u8], _: &str) -> Result<ModerationVerdict, AppError> {
        Ok(ModerationVerdict::unsafe_with("explicit", 0.99))
    }
}

#[tokio::test]
async fn test_content_moderation_rejects() {
    let app = setup_test_app_with(|_| {}, Some(Arc::new(RejectAll))).await;
    let request = app.signed(b"test-image", "0xABC", None).await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "CONTENT_REJECTED");
    assert!(!app
        .state
        .guard
        .ledger()
        .is_duplicate(&digest(b"test-image"), "0xABC")
        .await);
}

#[tokio::test]
async fn test_identity_with_invalid_characters() {
    let app = setup_test_app().await;
    let request = app.signed(b"test-image", "alice@example", None).await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(upload_form(&request))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["recoverable"], false);
}
