//! Sidecar text engine.
//!
//! Reads pre-recognized text from `<image>.txt` next to the image, e.g.
//! `box.jpg` → `box.jpg.txt`. Useful on hosts without Tesseract and for fixtures.

use std::path::{Path, PathBuf};

use super::{OcrEngine, OcrError, OcrResult};

pub struct SidecarText;

impl SidecarText {
    /// Path of the text file accompanying an image.
    pub fn sidecar_path(image_path: &Path) -> PathBuf {
        let mut name = image_path.as_os_str().to_owned();
        name.push(".txt");
        PathBuf::from(name)
    }
}

impl OcrEngine for SidecarText {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn recognize(&self, image_path: &Path) -> OcrResult<String> {
        let sidecar = Self::sidecar_path(image_path);
        if !sidecar.exists() {
            return Err(OcrError::ImageNotFound(sidecar));
        }
        Ok(std::fs::read_to_string(sidecar)?)
    }
}
