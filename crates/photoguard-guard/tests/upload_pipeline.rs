use photoguard_core::{AppError, CrossIdentityPolicy};
use photoguard_guard::{
    digest, prepare_upload_at, Ed25519Signer, FixedClock, InMemoryLedger, UploadGuard,
};
use photoguard_storage::{LocalStorage, Storage};
use std::sync::Arc;
use tempfile::TempDir;

const NOW: i64 = 1_700_000_000;

struct TestContext {
    _dir: TempDir,
    guard: UploadGuard,
    storage: Arc<LocalStorage>,
    clock: FixedClock,
    signer: Ed25519Signer,
}

async fn setup() -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(
        LocalStorage::new(dir.path(), "http://localhost:4000".to_string())
            .await
            .unwrap(),
    );
    let clock = FixedClock::new(NOW);
    let guard = UploadGuard::new(
        storage.clone(),
        Arc::new(InMemoryLedger::new()),
        Arc::new(clock.clone()),
    );
    TestContext {
        _dir: dir,
        guard,
        storage,
        clock,
        signer: Ed25519Signer::from_bytes(&[11u8; 32]),
    }
}

#[tokio::test]
async fn test_upload_stored_under_identity() {
    let ctx = setup().await;
    let request = prepare_upload_at(&ctx.signer, b"test-image".to_vec(), "0xABC", None, NOW)
        .await
        .unwrap();

    let receipt = ctx.guard.process(request).await.unwrap().into_receipt();

    let hash = digest(b"test-image");
    assert!(receipt.success);
    assert_eq!(receipt.file_hash, hash);
    assert!(receipt.image_url.contains("0xABC"));
    assert!(receipt.image_url.ends_with(&format!("{}.jpg", hash)));

    let key = format!("uploads/0xABC/{}.jpg", hash);
    assert_eq!(ctx.storage.download(&key).await.unwrap(), b"test-image");
    assert!(ctx.storage.base_path().join(&key).exists());
}

#[tokio::test]
async fn test_replay_after_ten_minutes_expires() {
    let ctx = setup().await;
    let request = prepare_upload_at(&ctx.signer, b"test-image".to_vec(), "0xABC", None, NOW)
        .await
        .unwrap();

    ctx.clock.advance(600);
    let result = ctx.guard.process(request).await;

    assert!(matches!(result, Err(AppError::TimestampExpired { .. })));
}

#[tokio::test]
async fn test_replay_within_window_is_duplicate() {
    let ctx = setup().await;
    let request = prepare_upload_at(&ctx.signer, b"test-image".to_vec(), "0xABC", None, NOW)
        .await
        .unwrap();

    ctx.guard.process(request.clone()).await.unwrap();
    ctx.clock.advance(30);
    let result = ctx.guard.process(request).await;

    assert!(matches!(result, Err(AppError::DuplicateUpload(_))));
}

#[tokio::test]
async fn test_declared_hash_must_match_file() {
    let ctx = setup().await;
    let mut request = prepare_upload_at(&ctx.signer, b"image-one".to_vec(), "0xABC", None, NOW)
        .await
        .unwrap();
    request.file_bytes = b"image-two".to_vec();

    let result = ctx.guard.process(request).await;

    match result {
        Err(AppError::HashMismatch { declared, computed }) => {
            assert_eq!(declared, digest(b"image-one"));
            assert_eq!(computed, digest(b"image-two"));
        }
        other => panic!("expected HashMismatch, got {:?}", other),
    }
    assert!(!ctx
        .storage
        .exists(&format!("uploads/0xABC/{}.jpg", digest(b"image-two")))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_concurrent_identical_requests_store_once() {
    let ctx = setup().await;
    let request = prepare_upload_at(&ctx.signer, b"test-image".to_vec(), "0xABC", None, NOW)
        .await
        .unwrap();

    const N: usize = 16;
    let handles: Vec<_> = (0..N)
        .map(|_| {
            let guard = ctx.guard.clone();
            let request = request.clone();
            tokio::spawn(async move { guard.process(request).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::DuplicateUpload(_))))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(duplicates, N - 1);

    let dir = ctx.storage.base_path().join("uploads/0xABC");
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_concurrent_cross_identity_under_reject_policy() {
    let ctx = setup().await;
    let guard = ctx.guard.clone().with_policy(CrossIdentityPolicy::Reject);

    let mut handles = Vec::new();
    for identity in ["0xA1", "0xB2", "0xC3", "0xD4"] {
        let request = prepare_upload_at(&ctx.signer, b"shared".to_vec(), identity, None, NOW)
            .await
            .unwrap();
        let guard = guard.clone();
        handles.push(tokio::spawn(async move { guard.process(request).await }));
    }

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AppError::DuplicateContent(_))))
            .count(),
        3
    );
}
