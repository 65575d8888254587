//! Verification records for dosing-time photo checks.

use serde::{Deserialize, Serialize};

use super::matching::CandidateMatch;

/// A completed verification of one patient photo against a user's medicines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationRecord {
    /// Unique verification ID
    pub verification_id: String,
    /// Patient user ID
    pub user_id: String,
    /// Local path or URL of the patient photo
    pub photo_ref: Option<String>,
    /// SHA-256 of the patient photo bytes (hex)
    pub photo_sha256: Option<String>,
    /// OCR text of the patient photo
    pub patient_ocr_text: String,
    /// One result per candidate medicine, in listing order
    pub results: Vec<CandidateMatch>,
    /// First result with maximal confidence
    pub best: CandidateMatch,
    /// Whether the best result is a match
    pub verified: bool,
    /// Verification timestamp
    pub verified_at: String,
}

impl VerificationRecord {
    /// Build a record from per-candidate results and the selected best match.
    pub fn new(
        user_id: String,
        patient_ocr_text: String,
        results: Vec<CandidateMatch>,
        best: CandidateMatch,
    ) -> Self {
        Self {
            verification_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            photo_ref: None,
            photo_sha256: None,
            patient_ocr_text,
            verified: best.is_match(),
            best,
            results,
            verified_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Number of candidate medicines that individually matched.
    pub fn matching_count(&self) -> usize {
        self.results.iter().filter(|c| c.is_match()).count()
    }
}

/// Delivery summary for one verification's notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationReport {
    pub sent_to_doctor: bool,
    pub sent_to_family: bool,
    pub total_sent: u32,
    pub errors: Vec<String>,
}

/// Result of running the verification flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The user has nothing registered to compare against
    NoRegisteredMedicines { patient_ocr_text: String },
    /// Comparison ran; record was persisted
    Completed {
        record: VerificationRecord,
        notifications: Option<NotificationReport>,
    },
}

impl VerificationOutcome {
    /// Whether the photo was verified as a registered medicine.
    pub fn verified(&self) -> bool {
        match self {
            VerificationOutcome::NoRegisteredMedicines { .. } => false,
            VerificationOutcome::Completed { record, .. } => record.verified,
        }
    }

    pub fn record(&self) -> Option<&VerificationRecord> {
        match self {
            VerificationOutcome::NoRegisteredMedicines { .. } => None,
            VerificationOutcome::Completed { record, .. } => Some(record),
        }
    }
}
