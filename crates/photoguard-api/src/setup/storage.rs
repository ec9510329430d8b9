//! Storage backend setup

use anyhow::{Context, Result};
use photoguard_core::Config;
use photoguard_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        path = %config.local_storage_path(),
        base_url = %config.local_storage_base_url(),
        "Storage initialized"
    );

    Ok(storage)
}
