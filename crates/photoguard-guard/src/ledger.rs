//! Record of accepted uploads used for duplicate detection.
//!
//! The in-memory ledger lives for the lifetime of the process and starts empty on
//! restart, so duplicate protection across restarts is best-effort.

use crate::freshness::{Clock, SystemClock};
use async_trait::async_trait;
use photoguard_core::{AppError, UploadRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait UploadLedger: Send + Sync {
    /// Live record for `(image_hash, identity)`, if any.
    async fn find(&self, image_hash: &str, identity: &str) -> Option<UploadRecord>;

    /// Live records for `image_hash` from any identity.
    async fn find_by_hash(&self, image_hash: &str) -> Vec<UploadRecord>;

    async fn record(&self, record: UploadRecord) -> Result<(), AppError>;

    async fn is_duplicate(&self, image_hash: &str, identity: &str) -> bool {
        self.find(image_hash, identity).await.is_some()
    }

    /// True when `image_hash` was accepted from some identity other than `identity`.
    async fn seen_from_other_identity(&self, image_hash: &str, identity: &str) -> bool {
        self.find_by_hash(image_hash)
            .await
            .iter()
            .any(|r| r.identity != identity)
    }
}

/// Process-local ledger keyed by image hash.
///
/// Without a TTL records are kept forever. With one, records older than the TTL are
/// treated as absent and pruned on the next write for that hash.
pub struct InMemoryLedger {
    entries: RwLock<HashMap<String, Vec<UploadRecord>>>,
    ttl_secs: Option<u64>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_ttl(None, Arc::new(SystemClock))
    }

    pub fn with_ttl(ttl_secs: Option<u64>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_secs,
            clock,
        }
    }

    fn is_live(&self, record: &UploadRecord, now: i64) -> bool {
        match self.ttl_secs {
            Some(ttl) => now.saturating_sub(record.timestamp) < ttl as i64,
            None => true,
        }
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .flatten()
            .filter(|r| self.is_live(r, now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired record. Returns how many were removed.
    pub async fn prune_expired(&self) -> usize {
        if self.ttl_secs.is_none() {
            return 0;
        }
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let mut removed = 0;
        entries.retain(|_, records| {
            let before = records.len();
            records.retain(|r| self.is_live(r, now));
            removed += before - records.len();
            !records.is_empty()
        });
        removed
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UploadLedger for InMemoryLedger {
    async fn find(&self, image_hash: &str, identity: &str) -> Option<UploadRecord> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(image_hash)?
            .iter()
            .find(|r| r.identity == identity && self.is_live(r, now))
            .cloned()
    }

    async fn find_by_hash(&self, image_hash: &str) -> Vec<UploadRecord> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(image_hash)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| self.is_live(r, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn record(&self, record: UploadRecord) -> Result<(), AppError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let records = entries.entry(record.image_hash.clone()).or_default();
        records.retain(|r| self.is_live(r, now) && r.identity != record.identity);
        records.push(record);
        Ok(())
    }
}
