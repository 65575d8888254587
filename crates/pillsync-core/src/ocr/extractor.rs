//! Text extraction from local or remote images.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use super::{fingerprint, OcrEngine, OcrError, OcrResult};
use crate::matcher::normalize;

/// Normalized text read from one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    /// SHA-256 of the image bytes, when they could be read
    pub sha256: Option<String>,
}

/// Reads text from images through one OCR engine chosen at startup.
pub struct TextExtractor {
    engine: Box<dyn OcrEngine>,
    client: reqwest::blocking::Client,
    fetch_timeout_secs: u64,
}

impl TextExtractor {
    pub fn new(engine: Box<dyn OcrEngine>, fetch_timeout_secs: u64) -> OcrResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(fetch_timeout_secs))
            .build()
            .map_err(|e| OcrError::Http(e.to_string()))?;

        Ok(Self {
            engine,
            client,
            fetch_timeout_secs,
        })
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Extract normalized text from a path or `http(s)://` URL.
    ///
    /// Failures are logged and yield empty text.
    pub fn extract(&self, source: &str) -> ExtractedText {
        match self.try_extract(source) {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::warn!(source, error = %e, "Text extraction failed");
                ExtractedText::default()
            }
        }
    }

    /// Extract normalized text, surfacing errors.
    pub fn try_extract(&self, source: &str) -> OcrResult<ExtractedText> {
        if is_remote(source) {
            self.extract_remote(source)
        } else {
            self.extract_local(Path::new(source))
        }
    }

    fn extract_local(&self, path: &Path) -> OcrResult<ExtractedText> {
        if !path.exists() {
            return Err(OcrError::ImageNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let raw = self.engine.recognize(path)?;

        Ok(ExtractedText {
            text: normalize(&raw),
            sha256: Some(fingerprint(&bytes)),
        })
    }

    fn extract_remote(&self, url: &str) -> OcrResult<ExtractedText> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                OcrError::Http(format!("Download timed out after {}s", self.fetch_timeout_secs))
            } else {
                OcrError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::Http(format!("{} returned {}", url, status)));
        }
        let bytes = response.bytes().map_err(|e| OcrError::Http(e.to_string()))?;

        // Removed when dropped, on success and error alike
        let mut image = tempfile::Builder::new()
            .prefix("pillsync-")
            .suffix(image_suffix(url))
            .tempfile()?;
        image.write_all(&bytes)?;
        image.flush()?;

        tracing::debug!(url, bytes = bytes.len(), "Downloaded image");
        let raw = self.engine.recognize(image.path())?;

        Ok(ExtractedText {
            text: normalize(&raw),
            sha256: Some(fingerprint(&bytes)),
        })
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// File suffix for a downloaded image, from the URL path's extension.
fn image_suffix(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    if path.ends_with(".png") {
        ".png"
    } else if path.ends_with(".webp") {
        ".webp"
    } else if path.ends_with(".tif") || path.ends_with(".tiff") {
        ".tiff"
    } else {
        ".jpg"
    }
}
