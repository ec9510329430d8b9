//! Photoguard CLI helpers: signing key loading and the upload client.

pub mod client;

use anyhow::Context;
use photoguard_guard::Ed25519Signer;
use std::path::Path;

/// Environment variable holding the hex secret key when `--key` is omitted.
pub const SECRET_KEY_ENV: &str = "PHOTOGUARD_SECRET_KEY";

/// Default server address for `upload`.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load the signing key from an explicit hex value or from `PHOTOGUARD_SECRET_KEY`.
pub fn load_signer(key: Option<&str>) -> anyhow::Result<Ed25519Signer> {
    let hex_key = match key {
        Some(key) => key.to_string(),
        None => std::env::var(SECRET_KEY_ENV).with_context(|| {
            format!("No signing key. Pass --key or set {}", SECRET_KEY_ENV)
        })?,
    };
    Ed25519Signer::from_hex(hex_key.trim()).map_err(|e| anyhow::anyhow!("{}", e))
}

/// Read an image from disk. Paths with `..` components are refused.
pub fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// MIME type sent for a file, guessed from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}
