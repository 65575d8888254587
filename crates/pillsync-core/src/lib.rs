//! PillSync Core Library
//!
//! Medicine photo verification: does the package in the patient's dosing-time photo
//! match a medicine they registered earlier?
//!
//! # Architecture
//!
//! ```text
//! Registration photo → OCR → normalize ──► medicines (name, OCR text)
//!                                                 │
//! Dosing-time photo  → OCR → normalize ──► Scorer (per medicine)
//!                                                 │
//!                                       Best-match selection
//!                                                 │
//!                                 ┌───────────────┴───────────────┐
//!                                 ▼                               ▼
//!                         verifications log              Care-team alerts
//!                                                      (email, then SMS)
//! ```
//!
//! # Core Principle
//!
//! **Matching is pure.** Scoring and selection take text and return values; OCR,
//! storage and notifications are collaborators injected around them.
//!
//! # Modules
//!
//! - [`matcher`]: normalizer, multi-signal scorer, best-match selector
//! - [`ocr`]: OCR engine selection and text extraction from paths or URLs
//! - [`db`]: SQLite storage for medicines, verifications and care contacts
//! - [`notify`]: care-team notifications
//! - [`verify`]: registration and verification flow
//! - [`config`]: runtime configuration

pub mod config;
pub mod db;
pub mod matcher;
pub mod models;
pub mod notify;
pub mod ocr;
pub mod verify;

// Re-export commonly used types
pub use config::{AppConfig, MatchConfig};
pub use db::Database;
pub use matcher::{compare, normalize, select_best, MatchError, Scorer};
pub use models::{
    CandidateMatch, CareTeam, Contact, ContactRole, MatchResult, NotificationReport,
    RegisteredMedicine, VerificationOutcome, VerificationRecord,
};
pub use notify::NotificationService;
pub use ocr::{select_engine, TextExtractor};
pub use verify::{register_medicine, MedicineRegistration, Verifier, VerifyRequest};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PillSyncError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No candidates to select from")]
    EmptyCandidateSet,
}

impl From<db::DbError> for PillSyncError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => PillSyncError::NotFound(what),
            db::DbError::Constraint(msg) => PillSyncError::InvalidInput(msg),
            other => PillSyncError::DatabaseError(other.to_string()),
        }
    }
}

impl From<MatchError> for PillSyncError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::EmptyCandidateSet => PillSyncError::EmptyCandidateSet,
        }
    }
}

impl From<verify::VerifyError> for PillSyncError {
    fn from(e: verify::VerifyError) -> Self {
        match e {
            verify::VerifyError::Database(db) => db.into(),
            verify::VerifyError::Matching(m) => m.into(),
            verify::VerifyError::InvalidInput(msg) => PillSyncError::InvalidInput(msg),
        }
    }
}

impl From<config::ConfigError> for PillSyncError {
    fn from(e: config::ConfigError) -> Self {
        PillSyncError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PillSyncError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PillSyncError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Matching Functions (exported to FFI)
// =========================================================================

/// Normalize raw OCR output.
#[uniffi::export]
pub fn normalize_text(raw: String) -> String {
    normalize(&raw)
}

/// Guess the medicine name printed in package text.
#[uniffi::export]
pub fn guess_medicine_name(text: String) -> Option<String> {
    matcher::guess_medicine_name(&text)
}

/// Compare patient photo text with a registered medicine.
///
/// `match_threshold` defaults to 0.6.
#[uniffi::export]
pub fn compare_text(
    patient_text: String,
    registered_name: String,
    registered_ocr: Option<String>,
    match_threshold: Option<f64>,
) -> Result<FfiMatchResult, PillSyncError> {
    let config = match_config(match_threshold)?;
    let result = Scorer::new(config).compare(&patient_text, &registered_name, registered_ocr.as_deref());
    Ok(result.into())
}

/// Default matching config with an optional threshold override.
fn match_config(match_threshold: Option<f64>) -> Result<MatchConfig, PillSyncError> {
    let mut config = MatchConfig::default();
    if let Some(threshold) = match_threshold {
        config = config.with_match_threshold(threshold);
    }
    config.validate()?;
    Ok(config)
}

/// Pick the result with the highest confidence; the earliest wins ties.
#[uniffi::export]
pub fn select_best_match(results: Vec<FfiMatchResult>) -> Result<FfiMatchResult, PillSyncError> {
    let best = matcher::select_best_by(&results, |r| r.confidence)?;
    Ok(best.clone())
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
///
/// `match_threshold` applies to every verification run through the returned core.
#[uniffi::export]
pub fn open_database(path: String, match_threshold: Option<f64>) -> Result<Arc<PillSyncCore>, PillSyncError> {
    let matching = match_config(match_threshold)?;
    let db = Database::open(&path)?;
    Ok(Arc::new(PillSyncCore::new(db, matching)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(match_threshold: Option<f64>) -> Result<Arc<PillSyncCore>, PillSyncError> {
    let matching = match_config(match_threshold)?;
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PillSyncCore::new(db, matching)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PillSyncCore {
    db: Arc<Mutex<Database>>,
    matching: MatchConfig,
}

impl PillSyncCore {
    fn new(db: Database, matching: MatchConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            matching,
        }
    }
}

#[uniffi::export]
impl PillSyncCore {
    // =========================================================================
    // Medicine Operations
    // =========================================================================

    /// Register a medicine with the OCR text of its package photo.
    pub fn register_medicine(
        &self,
        user_id: String,
        name: String,
        dosage: Option<String>,
        photo_ref: Option<String>,
        ocr_text: String,
    ) -> Result<FfiMedicine, PillSyncError> {
        let db = self.db.lock()?;
        let medicine = register_medicine(
            &db,
            MedicineRegistration {
                user_id,
                name,
                dosage,
                photo_ref,
                photo_sha256: None,
                ocr_text: normalize(&ocr_text),
            },
        )?;
        Ok(medicine.into())
    }

    /// Get a medicine by ID.
    pub fn get_medicine(&self, medicine_id: String) -> Result<Option<FfiMedicine>, PillSyncError> {
        let db = self.db.lock()?;
        Ok(db.get_medicine(&medicine_id)?.map(|m| m.into()))
    }

    /// List a user's medicines in registration order.
    pub fn list_medicines(&self, user_id: String) -> Result<Vec<FfiMedicine>, PillSyncError> {
        let db = self.db.lock()?;
        let medicines = db.list_medicines_for_user(&user_id)?;
        Ok(medicines.into_iter().map(|m| m.into()).collect())
    }

    /// Delete a medicine. Returns whether it existed.
    pub fn delete_medicine(&self, medicine_id: String) -> Result<bool, PillSyncError> {
        let db = self.db.lock()?;
        Ok(db.delete_medicine(&medicine_id)?)
    }

    // =========================================================================
    // Verification Operations
    // =========================================================================

    /// Verify patient photo text against the user's medicines.
    pub fn verify(
        &self,
        user_id: String,
        patient_ocr_text: String,
        medicine_id: Option<String>,
    ) -> Result<FfiVerificationOutcome, PillSyncError> {
        let db = self.db.lock()?;
        let verifier = Verifier::new(&db, self.matching);
        let outcome = verifier.verify(VerifyRequest {
            user_id,
            patient_ocr_text: normalize(&patient_ocr_text),
            photo_ref: None,
            photo_sha256: None,
            medicine_id,
        })?;
        Ok(outcome.into())
    }

    /// Recent verifications, newest first.
    pub fn list_verifications(
        &self,
        user_id: String,
        limit: Option<u32>,
    ) -> Result<Vec<FfiVerificationRecord>, PillSyncError> {
        let db = self.db.lock()?;
        let records = db.list_verifications_for_user(&user_id, limit.map(|l| l as usize))?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Care Team Operations
    // =========================================================================

    /// Add a doctor or family contact.
    pub fn add_contact(
        &self,
        user_id: String,
        role: String,
        name: String,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<(), PillSyncError> {
        let role = ContactRole::parse(&role)
            .ok_or_else(|| PillSyncError::InvalidInput(format!("Unknown contact role: {}", role)))?;
        let db = self.db.lock()?;
        db.add_contact(&user_id, role, &Contact { name, email, phone })?;
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe match result. Scores are rounded to three decimals.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMatchResult {
    pub is_match: bool,
    pub confidence: f64,
    pub direct_match: bool,
    pub similarity: f64,
    pub word_match_ratio: f64,
    pub ocr_match: bool,
    pub common_words: Vec<String>,
    pub registered_name: String,
    pub patient_text_excerpt: String,
}

impl From<MatchResult> for FfiMatchResult {
    fn from(result: MatchResult) -> Self {
        Self {
            is_match: result.is_match,
            confidence: models::round_score(result.confidence),
            direct_match: result.direct_match,
            similarity: models::round_score(result.similarity),
            word_match_ratio: models::round_score(result.word_match_ratio),
            ocr_match: result.ocr_match,
            common_words: result.common_words.into_iter().collect(),
            registered_name: result.registered_name,
            patient_text_excerpt: result.patient_text_excerpt,
        }
    }
}

/// FFI-safe registered medicine.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicine {
    pub medicine_id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: Option<String>,
    pub photo_ref: Option<String>,
    pub ocr_text: String,
    pub registered_at: String,
}

impl From<RegisteredMedicine> for FfiMedicine {
    fn from(medicine: RegisteredMedicine) -> Self {
        Self {
            medicine_id: medicine.medicine_id,
            user_id: medicine.user_id,
            name: medicine.name,
            dosage: medicine.dosage,
            photo_ref: medicine.photo_ref,
            ocr_text: medicine.ocr_text,
            registered_at: medicine.registered_at,
        }
    }
}

/// FFI-safe per-medicine comparison.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCandidateMatch {
    pub medicine_id: String,
    pub medicine_name: String,
    pub result: FfiMatchResult,
}

impl From<CandidateMatch> for FfiCandidateMatch {
    fn from(candidate: CandidateMatch) -> Self {
        Self {
            medicine_id: candidate.medicine_id,
            medicine_name: candidate.medicine_name,
            result: candidate.result.into(),
        }
    }
}

/// FFI-safe verification record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVerificationRecord {
    pub verification_id: String,
    pub user_id: String,
    pub patient_ocr_text: String,
    pub results: Vec<FfiCandidateMatch>,
    pub best: FfiCandidateMatch,
    pub verified: bool,
    pub verified_at: String,
}

impl From<VerificationRecord> for FfiVerificationRecord {
    fn from(record: VerificationRecord) -> Self {
        Self {
            verification_id: record.verification_id,
            user_id: record.user_id,
            patient_ocr_text: record.patient_ocr_text,
            results: record.results.into_iter().map(|c| c.into()).collect(),
            best: record.best.into(),
            verified: record.verified,
            verified_at: record.verified_at,
        }
    }
}

/// FFI-safe verification outcome. `record` is absent when nothing was registered.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVerificationOutcome {
    pub has_registered_medicines: bool,
    pub verified: bool,
    pub record: Option<FfiVerificationRecord>,
}

impl From<VerificationOutcome> for FfiVerificationOutcome {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::NoRegisteredMedicines { .. } => Self {
                has_registered_medicines: false,
                verified: false,
                record: None,
            },
            VerificationOutcome::Completed { record, .. } => Self {
                has_registered_medicines: true,
                verified: record.verified,
                record: Some(record.into()),
            },
        }
    }
}
