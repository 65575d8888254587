//! Tesseract command-line engine.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{OcrEngine, OcrError, OcrResult};

/// Characters Tesseract may emit for package labels.
const CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,- ";

/// Runs the `tesseract` binary with LSTM engine and uniform-block segmentation.
pub struct TesseractCli {
    binary: PathBuf,
}

impl TesseractCli {
    pub fn new(binary: &Path) -> Self {
        Self {
            binary: binary.to_path_buf(),
        }
    }

    fn args(image_path: &Path) -> Vec<String> {
        vec![
            image_path.display().to_string(),
            "stdout".into(),
            "--oem".into(),
            "3".into(),
            "--psm".into(),
            "6".into(),
            "-c".into(),
            format!("tessedit_char_whitelist={}", CHAR_WHITELIST),
        ]
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image_path: &Path) -> OcrResult<String> {
        if !image_path.exists() {
            return Err(OcrError::ImageNotFound(image_path.to_path_buf()));
        }

        let output = Command::new(&self.binary)
            .args(Self::args(image_path))
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                engine: self.name().to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
