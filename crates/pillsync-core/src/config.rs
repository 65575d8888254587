//! Runtime configuration.
//!
//! Every value is passed explicitly into the component that needs it; nothing here
//! is read from process-wide state except by `AppConfig::load`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchConfig,
    pub ocr: OcrConfig,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Load from a JSON file; a missing file yields defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.matching.validate()
    }
}

/// Scorer thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum confidence for a match
    pub match_threshold: f64,
    /// Similarity above which patient text counts as matching the registration OCR
    pub ocr_match_threshold: f64,
    /// Characters of patient text echoed in results
    pub excerpt_chars: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.6,
            ocr_match_threshold: 0.6,
            excerpt_chars: 100,
        }
    }
}

impl MatchConfig {
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("match_threshold", self.match_threshold),
            ("ocr_match_threshold", self.ocr_match_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// OCR engine selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    /// Engines to try, in order of preference ("tesseract", "sidecar")
    pub engines: Vec<String>,
    /// Tesseract executable
    pub tesseract_path: PathBuf,
    /// Timeout for downloading remote images
    pub fetch_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engines: vec!["tesseract".into(), "sidecar".into()],
            tesseract_path: PathBuf::from("tesseract"),
            fetch_timeout_secs: 30,
        }
    }
}

/// Notification channels and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub email: EmailConfig,
    pub sms: SmsConfig,
    /// Append one JSON line per dispatch to `log_file`
    pub notification_logs: bool,
    pub log_file: PathBuf,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email: EmailConfig::default(),
            sms: SmsConfig::default(),
            notification_logs: true,
            log_file: PathBuf::from("logs/notifications.log"),
        }
    }
}

/// Email delivery by SMTP submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Also the SMTP login
    pub sender_email: String,
    /// Empty disables SMTP authentication
    pub sender_password: String,
    /// Upgrade the connection with STARTTLS
    pub use_tls: bool,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
            use_tls: true,
            timeout_secs: 15,
        }
    }
}

/// SMS delivery through the Twilio REST API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmsConfig {
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            timeout_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.matching.match_threshold, 0.6);
        assert_eq!(config.matching.ocr_match_threshold, 0.6);
        assert_eq!(config.matching.excerpt_chars, 100);
        assert_eq!(config.ocr.engines, vec!["tesseract", "sidecar"]);
        assert_eq!(config.ocr.fetch_timeout_secs, 30);
        assert!(!config.notifications.email.enabled);
        assert_eq!(config.notifications.email.smtp_server, "smtp.gmail.com");
        assert_eq!(config.notifications.email.smtp_port, 587);
        assert!(config.notifications.email.use_tls);
        assert!(!config.notifications.sms.enabled);
        assert!(config.notifications.notification_logs);
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"matching": {"match_threshold": 0.75}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.matching.match_threshold, 0.75);
        assert_eq!(config.matching.excerpt_chars, 100);
        assert_eq!(config.ocr, OcrConfig::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.notifications.sms.enabled = true;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"matching": {"match_threshold": 1.5}}"#).unwrap();

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Invalid(_))));
    }
}
