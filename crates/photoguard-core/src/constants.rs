//! Protocol constants shared by the guard, the API and the CLI.

/// Literal first field of every signed upload message.
pub const UPLOAD_MESSAGE_TAG: &str = "upload_image";

/// Field separator of the signed upload message.
pub const MESSAGE_SEPARATOR: char = ':';

/// Maximum age in seconds of a signed message. Not configurable.
pub const FRESHNESS_WINDOW_SECS: i64 = 300;

/// Minimum decoded length of a detached signature.
pub const MIN_SIGNATURE_BYTES: usize = 64;

/// Minimum decoded length of a public key.
pub const MIN_PUBLIC_KEY_BYTES: usize = 32;

/// Number of hash hex characters kept when a digest is written to logs.
pub const LOG_HASH_PREFIX_LEN: usize = 12;

/// Top-level directory (and URL segment) holding stored uploads.
pub const UPLOADS_PREFIX: &str = "uploads";

/// Default number of lock stripes guarding ledger commits.
pub const DEFAULT_LOCK_SHARDS: usize = 64;

/// Shorten a hex digest for log output.
pub fn truncate_hash(hash: &str) -> &str {
    match hash.char_indices().nth(LOG_HASH_PREFIX_LEN) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
