//! Photoguard Guard Library
//!
//! The authenticated upload pipeline. A request carries file bytes, a detached
//! Ed25519 signature, the signer's public key and a signed message binding the
//! content hash, an optional device id, a timestamp and the uploader identity.
//! [`UploadGuard`] checks all of it in a fixed order and only then writes the file
//! and records the upload.

pub mod device;
pub mod freshness;
pub mod hasher;
pub mod ledger;
pub mod locks;
pub mod message;
pub mod moderation;
pub mod pipeline;
pub mod signature;

pub use freshness::{Clock, FixedClock, FreshnessGuard, SystemClock};
pub use hasher::{digest, digest_reader};
pub use ledger::{InMemoryLedger, UploadLedger};
pub use locks::KeyedLocks;
pub use message::{encode, encode_with_device, parse, ParsedMessage};
pub use moderation::{check_content, ContentModerator, ModerationVerdict};
pub use pipeline::{
    prepare_upload, prepare_upload_at, AcceptedUpload, UploadGuard, UploadRequest, UploadStage,
};
pub use signature::{verify, Ed25519Signer, MessageSigner, SignedMessage};
