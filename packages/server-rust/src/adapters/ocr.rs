//! OCR through the `tesseract` command-line engine.

use std::process::Stdio;

use async_trait::async_trait;
use dts_core::FileType;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

use super::{AdapterError, OcrEngine};
use crate::service::config::OcrConfig;

/// Spawns `tesseract stdin stdout -l <language>` per image.
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    #[must_use]
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

fn ocr_error(detail: impl std::fmt::Display) -> AdapterError {
    // Input was normalized to PNG before it got here.
    AdapterError::extraction(FileType::Png, format!("OCR failed: {detail}"))
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, png: Vec<u8>) -> Result<String, AdapterError> {
        let mut child = Command::new(&self.config.tesseract_path)
            .args(["stdin", "stdout", "-l", &self.config.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!(path = %self.config.tesseract_path.display(), error = %e, "tesseract unavailable");
                ocr_error(format!("cannot start {}: {e}", self.config.tesseract_path.display()))
            })?;

        // Feed stdin while stdout drains.
        let stdin = child.stdin.take();
        let feed = tokio::spawn(async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&png).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let output = child.wait_with_output().await.map_err(ocr_error)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ocr_error(format!("{}: {}", output.status, stderr.trim())));
        }
        feed.await.map_err(ocr_error)?.map_err(ocr_error)?;
        String::from_utf8(output.stdout).map_err(ocr_error)
    }
}
