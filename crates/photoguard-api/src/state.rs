//! Application state shared by all handlers.

use photoguard_core::Config;
use photoguard_guard::{ContentModerator, UploadGuard};
use photoguard_storage::Storage;
use std::sync::Arc;

/// Request validation limits applied before the guard runs.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes(),
            allowed_extensions: config.allowed_extensions().to_vec(),
            allowed_content_types: config.allowed_content_types().to_vec(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub guard: UploadGuard,
    pub storage: Arc<dyn Storage>,
    /// Optional classifier consulted before the guard
    pub moderator: Option<Arc<dyn ContentModerator>>,
    pub limits: UploadLimits,
}
