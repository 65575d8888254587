//! OCR collaborator.
//!
//! Pipeline: Engine selection (once) → Image fetch → Recognition → Normalization
//!
//! The matcher never knows which engine produced its text.

mod extractor;
mod sidecar;
mod tesseract;

pub use extractor::*;
pub use sidecar::*;
pub use tesseract::*;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::OcrConfig;

/// OCR errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("OCR engine {engine} failed: {message}")]
    EngineFailed { engine: String, message: String },

    #[error("No OCR engine available (tried: {0})")]
    NoEngineAvailable(String),

    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// Text recognition backend.
pub trait OcrEngine: Send + Sync {
    /// Short engine name used in configuration.
    fn name(&self) -> &str;

    /// Whether the engine can run on this host.
    fn is_available(&self) -> bool;

    /// Recognize the raw text printed in an image file.
    fn recognize(&self, image_path: &Path) -> OcrResult<String>;
}

/// Build the engines named in the configuration, in preference order.
///
/// Unknown names are logged and skipped.
pub fn configured_engines(config: &OcrConfig) -> Vec<Box<dyn OcrEngine>> {
    config
        .engines
        .iter()
        .filter_map(|name| match name.as_str() {
            "tesseract" => Some(Box::new(TesseractCli::new(&config.tesseract_path)) as Box<dyn OcrEngine>),
            "sidecar" => Some(Box::new(SidecarText) as Box<dyn OcrEngine>),
            other => {
                tracing::warn!(engine = other, "Unknown OCR engine in configuration, skipping");
                None
            }
        })
        .collect()
}

/// Select the first available configured engine.
pub fn select_engine(config: &OcrConfig) -> OcrResult<Box<dyn OcrEngine>> {
    select_first_available(configured_engines(config))
}

/// Select the first available engine from a preference-ordered list.
pub fn select_first_available(candidates: Vec<Box<dyn OcrEngine>>) -> OcrResult<Box<dyn OcrEngine>> {
    let tried: Vec<String> = candidates.iter().map(|e| e.name().to_string()).collect();

    for engine in candidates {
        if engine.is_available() {
            tracing::info!(engine = engine.name(), "Selected OCR engine");
            return Ok(engine);
        }
        tracing::debug!(engine = engine.name(), "OCR engine unavailable");
    }

    Err(OcrError::NoEngineAvailable(tried.join(", ")))
}

/// SHA-256 fingerprint of image bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
    pub available: bool,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            text: String::new(),
            available: false,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize(&self, _image_path: &Path) -> OcrResult<String> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_first_available() {
        let candidates: Vec<Box<dyn OcrEngine>> = vec![
            Box::new(MockOcrEngine::unavailable()),
            Box::new(MockOcrEngine::new("second")),
            Box::new(MockOcrEngine::new("third")),
        ];

        let engine = select_first_available(candidates).unwrap();
        assert_eq!(engine.recognize(Path::new("x.jpg")).unwrap(), "second");
    }

    #[test]
    fn test_no_engine_available() {
        let candidates: Vec<Box<dyn OcrEngine>> = vec![Box::new(MockOcrEngine::unavailable())];
        let err = select_first_available(candidates).err().unwrap();
        assert!(matches!(err, OcrError::NoEngineAvailable(ref tried) if tried == "mock"));
    }

    #[test]
    fn test_configured_engines_skip_unknown() {
        let config = OcrConfig {
            engines: vec!["easyocr".into(), "sidecar".into()],
            ..OcrConfig::default()
        };
        let engines = configured_engines(&config);
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0].name(), "sidecar");
    }

    #[test]
    fn test_select_engine_falls_back_to_sidecar() {
        let config = OcrConfig {
            engines: vec!["tesseract".into(), "sidecar".into()],
            tesseract_path: PathBuf::from("/nonexistent/tesseract"),
            ..OcrConfig::default()
        };
        assert_eq!(select_engine(&config).unwrap().name(), "sidecar");
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
