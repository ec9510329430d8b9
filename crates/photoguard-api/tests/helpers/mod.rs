//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p photoguard-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use photoguard_api::constants;
use photoguard_api::setup::{routes, services};
use photoguard_api::AppState;
use photoguard_core::{
    BaseConfig, Config, CrossIdentityPolicy, GuardConfig, StorageBackend,
};
use photoguard_guard::{
    prepare_upload_at, ContentModerator, Ed25519Signer, FixedClock, InMemoryLedger, UploadRequest,
};
use photoguard_storage::LocalStorage;
use std::sync::Arc;
use tempfile::TempDir;

pub const NOW: i64 = 1_700_000_000;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, clock, signer and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub clock: FixedClock,
    pub signer: Ed25519Signer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Signed upload request for `bytes`, stamped at the clock's current time.
    pub async fn signed(&self, bytes: &[u8], identity: &str, device_id: Option<&str>) -> UploadRequest {
        use photoguard_guard::Clock;
        prepare_upload_at(&self.signer, bytes.to_vec(), identity, device_id, self.clock.now())
            .await
            .unwrap()
    }
}

pub fn test_config(storage_path: &str) -> Config {
    Config(Box::new(GuardConfig {
        base: BaseConfig {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            json_logs: false,
        },
        storage_backend: StorageBackend::Local,
        local_storage_path: storage_path.to_string(),
        local_storage_base_url: "http://localhost:4000".to_string(),
        max_file_size_bytes: 1024 * 1024,
        allowed_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        cross_identity_policy: CrossIdentityPolicy::Allow,
        ledger_entry_ttl_secs: None,
        ledger_lock_shards: 8,
    }))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}, None).await
}

/// Setup test app with local storage in a temp dir, a fixed clock and an optional classifier.
pub async fn setup_test_app_with(
    customize: impl FnOnce(&mut GuardConfig),
    moderator: Option<Arc<dyn ContentModerator>>,
) -> TestApp {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(temp_dir.path().to_str().unwrap());
    customize(&mut config.0);

    let storage = Arc::new(
        LocalStorage::new(temp_dir.path(), config.local_storage_base_url().to_string())
            .await
            .unwrap(),
    );
    let clock = FixedClock::new(NOW);
    let ledger = Arc::new(InMemoryLedger::with_ttl(
        config.ledger_entry_ttl_secs(),
        Arc::new(clock.clone()),
    ));

    let state = services::build_state(
        &config,
        storage,
        ledger,
        Arc::new(clock.clone()),
        moderator,
    );
    let router = routes::setup_routes(&config, state.clone()).unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        state,
        clock,
        signer: Ed25519Signer::from_bytes(&[5u8; 32]),
        _temp_dir: temp_dir,
    }
}

/// Multipart form for a prepared request, sent as a JPEG named `photo.jpg`.
pub fn upload_form(request: &UploadRequest) -> MultipartForm {
    upload_form_named(request, "photo.jpg", "image/jpeg")
}

pub fn upload_form_named(request: &UploadRequest, filename: &str, mime: &str) -> MultipartForm {
    let mut form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(request.file_bytes.clone())
                .file_name(filename)
                .mime_type(mime),
        )
        .add_text("signature", request.signature.clone())
        .add_text("publicKey", request.public_key.clone())
        .add_text("message", request.message.clone())
        .add_text("userAddress", request.identity.clone());
    if let Some(device_id) = &request.device_id {
        form = form.add_text("deviceId", device_id.clone());
    }
    form
}
