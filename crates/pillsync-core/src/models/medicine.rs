//! Registered medicine models.

use serde::{Deserialize, Serialize};

/// A medicine registered by a user from a photo of its package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisteredMedicine {
    /// Unique medicine ID
    pub medicine_id: String,
    /// Owner user ID
    pub user_id: String,
    /// Medicine name as entered at registration (never empty)
    pub name: String,
    /// Free-form dosage instructions
    pub dosage: Option<String>,
    /// Local path or URL of the back-label photo
    pub photo_ref: Option<String>,
    /// SHA-256 of the photo bytes (hex)
    pub photo_sha256: Option<String>,
    /// OCR text extracted from the photo at registration, possibly empty
    pub ocr_text: String,
    /// Registration timestamp
    pub registered_at: String,
}

impl RegisteredMedicine {
    /// Create a new medicine with required fields.
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            medicine_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            name,
            dosage: None,
            photo_ref: None,
            photo_sha256: None,
            ocr_text: String::new(),
            registered_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Registration-time OCR text, if any was captured.
    pub fn registered_ocr(&self) -> Option<&str> {
        if self.ocr_text.is_empty() {
            None
        } else {
            Some(&self.ocr_text)
        }
    }
}
