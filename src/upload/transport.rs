//! Direct-to-cloud media transport.
//!
//! The backend never sees the file: a signature is fetched first, then the
//! bytes go straight to the provider with that signature attached.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::api::types::UploadSignature;
use crate::error::UploadError;

use super::UploadFile;

/// Percent-complete callback, invoked as bytes leave the client.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Seam for the third-party upload endpoint.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Stream `file` to the provider under `signature`'s authorization,
    /// reporting progress along the way. Returns the permanent secure URL.
    async fn send(
        &self,
        file: &UploadFile,
        signature: &UploadSignature,
        on_progress: ProgressFn,
    ) -> Result<String, UploadError>;
}

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
}

/// Cloudinary unsigned-asset upload endpoint client.
pub struct CloudinaryTransport {
    client: reqwest::Client,
}

impl CloudinaryTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn upload_url(cloud_name: &str) -> String {
        format!("https://api.cloudinary.com/v1_1/{cloud_name}/upload")
    }
}

impl Default for CloudinaryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaTransport for CloudinaryTransport {
    async fn send(
        &self,
        file: &UploadFile,
        signature: &UploadSignature,
        on_progress: ProgressFn,
    ) -> Result<String, UploadError> {
        let total = file.bytes.len().max(1);
        let sent = Arc::new(AtomicUsize::new(0));
        let chunks: Vec<Vec<u8>> = file
            .bytes
            .chunks(CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();

        // Chunks are handed to the body lazily, so each callback fires as
        // the corresponding bytes are consumed by the transfer.
        let counter = Arc::clone(&sent);
        let progress = Arc::clone(&on_progress);
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            let done = counter.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
            let percent = ((done * 100) / total).min(100) as u8;
            progress(percent);
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(stream), file.bytes.len() as u64)
            .file_name(file.name.clone());
        let form = Form::new()
            .text("timestamp", signature.timestamp.to_string())
            .text("signature", signature.signature.clone())
            .text("api_key", signature.api_key.clone())
            .text("folder", signature.folder.clone())
            .part("file", part);

        let resp = self
            .client
            .post(Self::upload_url(&signature.cloud_name))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transfer(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Transfer(format!(
                "provider returned {status}: {body}"
            )));
        }

        let parsed: CloudinaryResponse = resp
            .json()
            .await
            .map_err(|e| UploadError::Transfer(e.to_string()))?;
        Ok(parsed.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_targets_the_signed_cloud() {
        assert_eq!(
            CloudinaryTransport::upload_url("demo"),
            "https://api.cloudinary.com/v1_1/demo/upload"
        );
    }
}
