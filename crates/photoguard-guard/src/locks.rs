//! Striped async locks keyed by string.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Fixed set of mutexes; a key always maps to the same stripe.
///
/// Holding the guard for a key serializes every other holder of that key. Distinct
/// keys only contend when they land on the same stripe.
#[derive(Clone)]
pub struct KeyedLocks {
    shards: Vec<Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count).map(|_| Arc::new(Mutex::new(()))).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let shard = self.shards[self.shard_index(key)].clone();
        shard.lock_owned().await
    }
}
