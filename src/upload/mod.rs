//! Media upload coordination — two-phase signed uploads with per-slot
//! progress tracking.
//!
//! Each asset slot uploads independently; one slot failing never disturbs
//! another slot's progress or stored URL.

mod transport;

pub use transport::{CloudinaryTransport, MediaTransport, ProgressFn};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::api::WizardApi;
use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::wizard::forms::FormData;

/// Number of image slots an ad carries.
pub const IMAGE_SLOTS: usize = 3;

const IMAGE_MAX_BYTES: u64 = 5 * 1024 * 1024;
const VIDEO_MAX_BYTES: u64 = 100 * 1024 * 1024;
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv"];

/// First progress value a slot shows, before any bytes have moved.
const PROGRESS_SENTINEL: u8 = 1;

/// An ad's media slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSlot {
    Video,
    /// Image slot 0..=2.
    Image(usize),
}

impl MediaSlot {
    /// Progress-map key for this slot.
    pub fn key(&self) -> String {
        match self {
            Self::Video => "video".to_string(),
            Self::Image(index) => format!("image_{index}"),
        }
    }
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read a file from disk.
    pub async fn read(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }

    fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

/// Drives signed uploads and records the resulting URLs into the ad form's
/// media slice.
pub struct Uploader {
    api: Arc<dyn WizardApi>,
    transport: Arc<dyn MediaTransport>,
    forms: Arc<RwLock<FormData>>,
    progress: Arc<Mutex<HashMap<String, u8>>>,
    folder: String,
    cleanup_delay: Duration,
}

impl Uploader {
    pub fn new(
        api: Arc<dyn WizardApi>,
        transport: Arc<dyn MediaTransport>,
        forms: Arc<RwLock<FormData>>,
        config: &UploadConfig,
    ) -> Self {
        Self {
            api,
            transport,
            forms,
            progress: Arc::new(Mutex::new(HashMap::new())),
            folder: config.folder.clone(),
            cleanup_delay: config.cleanup_delay,
        }
    }

    /// Snapshot of every slot's percent complete.
    pub fn progress(&self) -> HashMap<String, u8> {
        self.progress.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Upload one file into one slot.
    ///
    /// Phase one fetches a signature from the backend for the configured
    /// folder; phase two streams the file to the provider. On success the
    /// permanent URL lands in the ad's media slot. On failure at either
    /// phase the slot's stored URL is left exactly as it was.
    pub async fn upload(
        &self,
        file: UploadFile,
        slot: MediaSlot,
    ) -> Result<String, UploadError> {
        if let MediaSlot::Image(index) = slot {
            if index >= IMAGE_SLOTS {
                return Err(UploadError::SlotOutOfRange(index));
            }
        }
        self.screen(&file, slot)?;

        let key = slot.key();
        self.set_progress(&key, PROGRESS_SENTINEL);
        tracing::info!(slot = %key, file = %file.name, bytes = file.bytes.len(), "upload started");

        let signature = match self.api.upload_signature(&self.folder).await {
            Ok(signature) => signature,
            Err(e) => {
                self.schedule_cleanup(&key);
                let err =
                    UploadError::Signature(e.user_message("Failed to get upload signature"));
                tracing::warn!(slot = %key, error = %err, "upload aborted");
                return Err(err);
            }
        };

        let progress = Arc::clone(&self.progress);
        let progress_key = key.clone();
        let on_progress: ProgressFn = Arc::new(move |percent| {
            if let Ok(mut map) = progress.lock() {
                map.insert(progress_key.clone(), percent);
            }
        });

        match self.transport.send(&file, &signature, on_progress).await {
            Ok(url) => {
                {
                    let mut forms = self.forms.write().await;
                    match slot {
                        MediaSlot::Video => forms.ad.media.video = Some(url.clone()),
                        MediaSlot::Image(index) => {
                            forms.ad.media.images[index] = Some(url.clone());
                        }
                    }
                }
                self.set_progress(&key, 100);
                self.schedule_cleanup(&key);
                tracing::info!(slot = %key, "upload complete");
                Ok(url)
            }
            Err(e) => {
                self.schedule_cleanup(&key);
                tracing::warn!(slot = %key, error = %e, "upload failed");
                Err(e)
            }
        }
    }

    /// Client-side screening: slot-appropriate file type and size cap.
    fn screen(&self, file: &UploadFile, slot: MediaSlot) -> Result<(), UploadError> {
        let (extensions, limit) = match slot {
            MediaSlot::Video => (VIDEO_EXTENSIONS, VIDEO_MAX_BYTES),
            MediaSlot::Image(_) => (IMAGE_EXTENSIONS, IMAGE_MAX_BYTES),
        };
        if !extensions.contains(&file.extension().as_str()) {
            return Err(UploadError::UnsupportedType {
                name: file.name.clone(),
            });
        }
        let size = file.bytes.len() as u64;
        if size > limit {
            return Err(UploadError::TooLarge { size, limit });
        }
        Ok(())
    }

    fn set_progress(&self, key: &str, percent: u8) {
        if let Ok(mut map) = self.progress.lock() {
            map.insert(key.to_string(), percent);
        }
    }

    /// Drop the progress entry after the cosmetic linger delay.
    fn schedule_cleanup(&self, key: &str) {
        let progress = Arc::clone(&self.progress);
        let key = key.to_string();
        let delay = self.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut map) = progress.lock() {
                map.remove(&key);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_keys() {
        assert_eq!(MediaSlot::Video.key(), "video");
        assert_eq!(MediaSlot::Image(0).key(), "image_0");
        assert_eq!(MediaSlot::Image(2).key(), "image_2");
    }

    #[test]
    fn extension_is_case_insensitive() {
        let file = UploadFile {
            name: "Photo.JPG".to_string(),
            bytes: vec![0; 8],
        };
        assert_eq!(file.extension(), "jpg");
    }
}
