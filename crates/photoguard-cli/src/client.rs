//! HTTP client for the upload endpoint.

use anyhow::{Context, Result};
use photoguard_core::UploadReceipt;
use photoguard_guard::UploadRequest;
use reqwest::multipart::{Form, Part};

const UPLOAD_PATH: &str = "/api/v1/uploads";

pub struct UploadClient {
    client: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }

    /// Submit a signed upload. Non-2xx responses become errors carrying the server's body.
    pub async fn upload(&self, request: UploadRequest, filename: &str) -> Result<UploadReceipt> {
        let file = Part::bytes(request.file_bytes)
            .file_name(filename.to_string())
            .mime_str(&request.content_type)
            .context("Invalid content type")?;

        let mut form = Form::new()
            .part("file", file)
            .text("signature", request.signature)
            .text("publicKey", request.public_key)
            .text("message", request.message)
            .text("userAddress", request.identity);
        if let Some(device_id) = request.device_id {
            form = form.text("deviceId", device_id);
        }

        let url = self.upload_url();
        tracing::debug!(url = %url, "Sending upload");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Upload rejected ({}): {}", status, body));
        }

        response
            .json::<UploadReceipt>()
            .await
            .context("Failed to parse upload response")
    }
}
