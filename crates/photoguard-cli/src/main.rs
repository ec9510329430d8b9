//! Photoguard CLI: key generation, message signing and signed uploads.
//!
//! The signing key is read from `--key` or PHOTOGUARD_SECRET_KEY (hex, 32 bytes).

use anyhow::Context;
use clap::{Parser, Subcommand};
use photoguard_cli::client::UploadClient;
use photoguard_cli::{content_type_for, init_tracing, load_signer, read_image, DEFAULT_API_URL};
use photoguard_guard::{prepare_upload, Ed25519Signer};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photoguard", about = "Photoguard signed upload client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new Ed25519 key pair
    Keygen,
    /// Sign an image and print the upload fields
    Sign {
        /// Path to the image
        file: PathBuf,
        /// Account address bound into the message
        #[arg(long)]
        identity: String,
        /// Optional device fingerprint
        #[arg(long)]
        device_id: Option<String>,
        /// Hex secret key
        #[arg(long)]
        key: Option<String>,
    },
    /// Sign and upload an image
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Account address bound into the message
        #[arg(long)]
        identity: String,
        /// Optional device fingerprint
        #[arg(long)]
        device_id: Option<String>,
        /// Hex secret key
        #[arg(long)]
        key: Option<String>,
        /// Server base URL
        #[arg(long, env = "PHOTOGUARD_API_URL", default_value = DEFAULT_API_URL)]
        url: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => {
            let signer = Ed25519Signer::generate();
            print_json(&serde_json::json!({
                "publicKey": signer.public_key_hex(),
                "secretKey": signer.secret_key_hex(),
            }))?;
        }
        Commands::Sign {
            file,
            identity,
            device_id,
            key,
        } => {
            let signer = load_signer(key.as_deref())?;
            let bytes = read_image(&file)?;
            let request = prepare_upload(&signer, bytes, &identity, device_id.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            print_json(&serde_json::json!({
                "signature": request.signature,
                "publicKey": request.public_key,
                "message": request.message,
                "userAddress": request.identity,
                "deviceId": request.device_id,
            }))?;
        }
        Commands::Upload {
            file,
            identity,
            device_id,
            key,
            url,
        } => {
            let signer = load_signer(key.as_deref())?;
            let bytes = read_image(&file)?;
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image.jpg")
                .to_string();
            let mut request = prepare_upload(&signer, bytes, &identity, device_id.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            request.content_type = content_type_for(&file).to_string();

            let receipt = UploadClient::new(&url).upload(request, &filename).await?;
            print_json(&receipt)?;
        }
    }

    Ok(())
}
