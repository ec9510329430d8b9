//! Upload pipeline.
//!
//! ```text
//! Received -> SignatureChecked -> MessageParsed -> TimestampChecked -> HashBound
//!          -> DuplicateChecked -> DeviceChecked -> Stored
//! ```
//!
//! Every stage can reject. Nothing is written before `DeviceChecked` passes, and the
//! duplicate check, the storage write and the ledger record happen under one per-key
//! lock so concurrent identical requests cannot both be accepted.

use crate::device;
use crate::freshness::{Clock, FreshnessGuard};
use crate::hasher::digest;
use crate::ledger::UploadLedger;
use crate::locks::KeyedLocks;
use crate::message::{encode_at, parse, ParsedMessage};
use crate::signature::{verify, MessageSigner};
use photoguard_core::constants::{truncate_hash, DEFAULT_LOCK_SHARDS};
use photoguard_core::{
    AppError, CrossIdentityPolicy, ErrorMetadata, LogLevel, StoredFile, UploadReceipt,
    UploadRecord,
};
use photoguard_storage::{stored_filename, validate_path_segment, Storage, StorageError};
use std::fmt;
use std::sync::Arc;

const DEFAULT_EXTENSION: &str = "jpg";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    SignatureChecked,
    MessageParsed,
    TimestampChecked,
    HashBound,
    DuplicateChecked,
    DeviceChecked,
    Stored,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::SignatureChecked => "signature_checked",
            UploadStage::MessageParsed => "message_parsed",
            UploadStage::TimestampChecked => "timestamp_checked",
            UploadStage::HashBound => "hash_bound",
            UploadStage::DuplicateChecked => "duplicate_checked",
            UploadStage::DeviceChecked => "device_checked",
            UploadStage::Stored => "stored",
        };
        f.write_str(name)
    }
}

/// One upload attempt as submitted by a client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_bytes: Vec<u8>,
    /// Hex, optional `0x` prefix
    pub signature: String,
    /// Hex, optional `0x` prefix
    pub public_key: String,
    pub message: String,
    pub identity: String,
    pub device_id: Option<String>,
    /// Extension used for the stored filename, without the dot
    pub extension: String,
    pub content_type: String,
}

impl UploadRequest {
    pub fn new(
        file_bytes: Vec<u8>,
        signature: impl Into<String>,
        public_key: impl Into<String>,
        message: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            file_bytes,
            signature: signature.into(),
            public_key: public_key.into(),
            message: message.into(),
            identity: identity.into(),
            device_id: None,
            extension: DEFAULT_EXTENSION.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_file_type(
        mut self,
        extension: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.extension = extension.into();
        self.content_type = content_type.into();
        self
    }

    fn missing_field(&self) -> Option<&'static str> {
        if self.file_bytes.is_empty() {
            Some("file")
        } else if self.signature.trim().is_empty() {
            Some("signature")
        } else if self.public_key.trim().is_empty() {
            Some("publicKey")
        } else if self.message.is_empty() {
            Some("message")
        } else if self.identity.trim().is_empty() {
            Some("userAddress")
        } else {
            None
        }
    }
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct AcceptedUpload {
    pub image_hash: String,
    pub stored: StoredFile,
    pub record: UploadRecord,
    pub signature: String,
    pub message: String,
}

impl AcceptedUpload {
    pub fn into_receipt(self) -> UploadReceipt {
        UploadReceipt {
            success: true,
            image_url: self.stored.url,
            file_hash: self.image_hash,
            signature: self.signature,
            message: self.message,
        }
    }
}

/// Accept pipeline over injected storage, ledger and clock.
#[derive(Clone)]
pub struct UploadGuard {
    storage: Arc<dyn Storage>,
    ledger: Arc<dyn UploadLedger>,
    freshness: FreshnessGuard,
    locks: KeyedLocks,
    policy: CrossIdentityPolicy,
}

impl UploadGuard {
    pub fn new(
        storage: Arc<dyn Storage>,
        ledger: Arc<dyn UploadLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            ledger,
            freshness: FreshnessGuard::new(clock),
            locks: KeyedLocks::new(DEFAULT_LOCK_SHARDS),
            policy: CrossIdentityPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CrossIdentityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_lock_shards(mut self, shards: usize) -> Self {
        self.locks = KeyedLocks::new(shards);
        self
    }

    pub fn policy(&self) -> CrossIdentityPolicy {
        self.policy
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn ledger(&self) -> &Arc<dyn UploadLedger> {
        &self.ledger
    }

    /// Run the full pipeline. On error nothing has been stored or recorded.
    #[tracing::instrument(skip_all, fields(identity = %request.identity))]
    pub async fn process(&self, request: UploadRequest) -> Result<AcceptedUpload, AppError> {
        let computed = digest(&request.file_bytes);
        let result = self.run(request, &computed).await;
        if let Err(e) = &result {
            log_rejection(e, &computed);
        }
        result
    }

    async fn run(
        &self,
        request: UploadRequest,
        computed: &str,
    ) -> Result<AcceptedUpload, AppError> {
        if let Some(field) = request.missing_field() {
            return Err(AppError::MissingInput(field.to_string()));
        }
        advance(UploadStage::Received);

        if !verify(&request.message, &request.signature, &request.public_key) {
            return Err(AppError::InvalidSignature(
                "signature does not verify for message and public key".to_string(),
            ));
        }
        advance(UploadStage::SignatureChecked);

        let parsed = parse(&request.message).ok_or_else(|| {
            AppError::MalformedMessage(
                "expected upload_image:<hash>[:<deviceId>]:<timestamp>:<identity>".to_string(),
            )
        })?;
        if parsed.identity != request.identity {
            return Err(AppError::IdentityMismatch {
                claimed: request.identity.clone(),
                signed: parsed.identity,
            });
        }
        validate_path_segment(&parsed.identity)
            .map_err(|e| AppError::InvalidInput(format!("identity: {}", e)))?;
        advance(UploadStage::MessageParsed);

        let now = self.freshness.now();
        if !FreshnessGuard::is_fresh_at(parsed.timestamp, now) {
            return Err(AppError::TimestampExpired {
                timestamp: parsed.timestamp,
                now,
            });
        }
        advance(UploadStage::TimestampChecked);

        if !parsed.image_hash.eq_ignore_ascii_case(computed) {
            return Err(AppError::HashMismatch {
                declared: parsed.image_hash,
                computed: computed.to_string(),
            });
        }
        advance(UploadStage::HashBound);

        let _guard = self.locks.lock(&self.lock_key(computed, &request.identity)).await;
        self.check_duplicate(computed, &request.identity).await?;
        advance(UploadStage::DuplicateChecked);

        device::check(request.device_id.as_deref(), parsed.device_id.as_deref())?;
        advance(UploadStage::DeviceChecked);

        let stored = self.commit(&request, &parsed, computed, now).await?;
        advance(UploadStage::Stored);

        tracing::info!(
            hash = %truncate_hash(computed),
            key = %stored.storage_key,
            "Upload accepted"
        );

        Ok(AcceptedUpload {
            image_hash: computed.to_string(),
            record: UploadRecord {
                image_hash: computed.to_string(),
                identity: request.identity,
                timestamp: now,
            },
            stored,
            signature: request.signature,
            message: request.message,
        })
    }

    fn lock_key(&self, image_hash: &str, identity: &str) -> String {
        match self.policy {
            CrossIdentityPolicy::Allow => format!("{}:{}", image_hash, identity),
            CrossIdentityPolicy::Reject => image_hash.to_string(),
        }
    }

    async fn check_duplicate(&self, image_hash: &str, identity: &str) -> Result<(), AppError> {
        if self.ledger.is_duplicate(image_hash, identity).await {
            return Err(AppError::DuplicateUpload(format!(
                "image {} already uploaded by {}",
                truncate_hash(image_hash),
                identity
            )));
        }
        if self.policy == CrossIdentityPolicy::Reject
            && self.ledger.seen_from_other_identity(image_hash, identity).await
        {
            return Err(AppError::DuplicateContent(format!(
                "image {} already uploaded by another account",
                truncate_hash(image_hash)
            )));
        }
        Ok(())
    }

    /// Write the file, then record it. A failed record removes the file again.
    async fn commit(
        &self,
        request: &UploadRequest,
        parsed: &ParsedMessage,
        image_hash: &str,
        now: i64,
    ) -> Result<StoredFile, AppError> {
        let filename = stored_filename(image_hash, &request.extension);
        let stored = self
            .storage
            .upload(
                &parsed.identity,
                &filename,
                &request.content_type,
                request.file_bytes.clone(),
            )
            .await
            .map_err(|e| match e {
                StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
                e => AppError::StorageFailure(e.to_string()),
            })?;

        let record = UploadRecord {
            image_hash: image_hash.to_string(),
            identity: parsed.identity.clone(),
            timestamp: now,
        };
        if let Err(e) = self.ledger.record(record).await {
            if let Err(delete_err) = self.storage.delete(&stored.storage_key).await {
                tracing::error!(
                    key = %stored.storage_key,
                    error = %delete_err,
                    "Failed to remove file after ledger record failure"
                );
            }
            return Err(e);
        }

        Ok(stored)
    }
}

fn advance(stage: UploadStage) {
    tracing::debug!(stage = %stage, "Upload stage passed");
}

fn log_rejection(error: &AppError, computed: &str) {
    let hash = truncate_hash(computed);
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Error => tracing::error!(hash = %hash, code, error = %error, "Upload rejected"),
        LogLevel::Warn => tracing::warn!(hash = %hash, code, error = %error, "Upload rejected"),
        LogLevel::Info => tracing::info!(hash = %hash, code, error = %error, "Upload rejected"),
        LogLevel::Debug => tracing::debug!(hash = %hash, code, error = %error, "Upload rejected"),
    }
}

/// Client side: hash `file_bytes`, build the signed message for the current time and
/// sign it.
pub async fn prepare_upload(
    signer: &dyn MessageSigner,
    file_bytes: Vec<u8>,
    identity: &str,
    device_id: Option<&str>,
) -> Result<UploadRequest, AppError> {
    prepare_upload_at(
        signer,
        file_bytes,
        identity,
        device_id,
        chrono::Utc::now().timestamp(),
    )
    .await
}

/// [`prepare_upload`] with an explicit message timestamp.
pub async fn prepare_upload_at(
    signer: &dyn MessageSigner,
    file_bytes: Vec<u8>,
    identity: &str,
    device_id: Option<&str>,
    timestamp: i64,
) -> Result<UploadRequest, AppError> {
    let image_hash = digest(&file_bytes);
    let message = encode_at(&image_hash, device_id, timestamp, identity);
    let signed = signer.sign(message.as_bytes()).await?;

    let request = UploadRequest::new(
        file_bytes,
        signed.signature,
        signed.public_key,
        message,
        identity,
    );
    Ok(match device_id {
        Some(device_id) => request.with_device_id(device_id),
        None => request,
    })
}
