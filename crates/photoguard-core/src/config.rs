//! Configuration module
//!
//! This module provides configuration structures for the upload guard service,
//! loaded from the environment (and an optional `.env` file).

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::DEFAULT_LOCK_SHARDS;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_FILE_SIZE_MB: usize = 10;
const LOCAL_STORAGE_PATH: &str = "./uploads";

/// How the ledger treats an image hash already accepted from a different identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossIdentityPolicy {
    /// Accept it; each identity gets its own stored copy.
    #[default]
    Allow,
    /// Reject it as duplicate content.
    Reject,
}

impl FromStr for CrossIdentityPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(CrossIdentityPolicy::Allow),
            "reject" => Ok(CrossIdentityPolicy::Reject),
            _ => Err(anyhow::anyhow!(
                "Invalid cross-identity duplicate policy: {} (expected 'allow' or 'reject')",
                s
            )),
        }
    }
}

impl Display for CrossIdentityPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CrossIdentityPolicy::Allow => write!(f, "allow"),
            CrossIdentityPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub json_logs: bool,
}

/// Upload guard configuration
#[derive(Clone, Debug)]
pub struct GuardConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload validation
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Ledger behaviour
    pub cross_identity_policy: CrossIdentityPolicy,
    /// None = entries never expire.
    pub ledger_entry_ttl_secs: Option<u64>,
    pub ledger_lock_shards: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GuardConfig>);

impl Config {
    fn as_guard(&self) -> &GuardConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_guard().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GuardConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_guard().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_guard().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_guard().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_guard().base.environment
    }

    pub fn json_logs(&self) -> bool {
        self.as_guard().base.json_logs
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_guard().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_guard().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.as_guard().local_storage_base_url
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_guard().max_file_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_guard().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_guard().allowed_content_types
    }

    pub fn cross_identity_policy(&self) -> CrossIdentityPolicy {
        self.as_guard().cross_identity_policy
    }

    pub fn ledger_entry_ttl_secs(&self) -> Option<u64> {
        self.as_guard().ledger_entry_ttl_secs
    }

    pub fn ledger_lock_shards(&self) -> usize {
        self.as_guard().ledger_lock_shards
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl GuardConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Local,
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let cross_identity_policy = match env::var("CROSS_IDENTITY_DUPLICATES") {
            Ok(value) => value.parse()?,
            Err(_) => CrossIdentityPolicy::default(),
        };

        let ledger_entry_ttl_secs = match env::var("LEDGER_ENTRY_TTL_SECS") {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().parse::<u64>().map_err(
                |_| anyhow::anyhow!("LEDGER_ENTRY_TTL_SECS must be a number of seconds"),
            )?),
            _ => None,
        };

        let config = GuardConfig {
            base,
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions: split_list(
                &env::var("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| "jpg,jpeg,png,webp,heic".to_string()),
            ),
            allowed_content_types: split_list(&env::var("ALLOWED_CONTENT_TYPES").unwrap_or_else(
                |_| "image/jpeg,image/png,image/webp,image/heic".to_string(),
            )),
            cross_identity_policy,
            ledger_entry_ttl_secs,
            ledger_lock_shards: env::var("LEDGER_LOCK_SHARDS")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_LOCK_SHARDS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if self.ledger_lock_shards == 0 {
            return Err(anyhow::anyhow!("LEDGER_LOCK_SHARDS must be at least 1"));
        }

        if self.ledger_entry_ttl_secs == Some(0) {
            return Err(anyhow::anyhow!(
                "LEDGER_ENTRY_TTL_SECS must be positive; leave it unset to disable expiry"
            ));
        }

        if self.storage_backend == StorageBackend::Local {
            if self.local_storage_path.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "LOCAL_STORAGE_PATH must be set when using local storage backend"
                ));
            }
            if !self.local_storage_base_url.starts_with("http://")
                && !self.local_storage_base_url.starts_with("https://")
                && !self.local_storage_base_url.starts_with('/')
            {
                return Err(anyhow::anyhow!(
                    "LOCAL_STORAGE_BASE_URL must be an http(s) URL or an absolute path"
                ));
            }
        }

        Ok(())
    }
}
