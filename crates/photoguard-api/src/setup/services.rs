//! Guard and ledger wiring

use crate::state::{AppState, UploadLimits};
use anyhow::Result;
use photoguard_core::Config;
use photoguard_guard::{Clock, ContentModerator, InMemoryLedger, SystemClock, UploadGuard};
use photoguard_storage::Storage;
use std::sync::Arc;
use std::time::Duration;

/// Build the application state and start background maintenance.
pub async fn initialize_services(
    config: &Config,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ledger = Arc::new(InMemoryLedger::with_ttl(
        config.ledger_entry_ttl_secs(),
        clock.clone(),
    ));

    if let Some(ttl) = config.ledger_entry_ttl_secs() {
        spawn_ledger_pruning(ledger.clone(), ttl);
    }

    let state = build_state(config, storage, ledger, clock, None);

    tracing::info!(
        policy = %config.cross_identity_policy(),
        ledger_ttl_secs = ?config.ledger_entry_ttl_secs(),
        lock_shards = config.ledger_lock_shards(),
        "Upload guard initialized"
    );

    Ok(state)
}

/// Assemble state from already constructed parts.
pub fn build_state(
    config: &Config,
    storage: Arc<dyn Storage>,
    ledger: Arc<InMemoryLedger>,
    clock: Arc<dyn Clock>,
    moderator: Option<Arc<dyn ContentModerator>>,
) -> Arc<AppState> {
    let guard = UploadGuard::new(storage.clone(), ledger, clock)
        .with_policy(config.cross_identity_policy())
        .with_lock_shards(config.ledger_lock_shards());

    Arc::new(AppState {
        config: config.clone(),
        guard,
        storage,
        moderator,
        limits: UploadLimits::from_config(config),
    })
}

fn spawn_ledger_pruning(ledger: Arc<InMemoryLedger>, ttl_secs: u64) {
    // Every minute, or every TTL when shorter
    let period = Duration::from_secs(ttl_secs.clamp(1, 60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = ledger.prune_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned expired ledger entries");
            }
        }
    });
}
