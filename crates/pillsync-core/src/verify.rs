//! Medicine registration and dosing-time verification.
//!
//! Pipeline: Candidate lookup → Scoring → Best-match selection → Persist → Notify

use thiserror::Error;

use crate::config::MatchConfig;
use crate::db::{Database, DbError};
use crate::matcher::{select_best_by, MatchError, Scorer};
use crate::models::{
    CareTeam, NotificationReport, RegisteredMedicine, VerificationOutcome, VerificationRecord,
};
use crate::notify::NotificationService;

/// Verification errors.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Matching error: {0}")]
    Matching(#[from] MatchError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type VerifyResult<T> = Result<T, VerifyError>;

/// Fields supplied when registering a medicine.
#[derive(Debug, Clone, Default)]
pub struct MedicineRegistration {
    pub user_id: String,
    pub name: String,
    pub dosage: Option<String>,
    pub photo_ref: Option<String>,
    pub photo_sha256: Option<String>,
    /// Normalized OCR text of the registration photo, possibly empty
    pub ocr_text: String,
}

/// Validate and store a new medicine.
pub fn register_medicine(db: &Database, registration: MedicineRegistration) -> VerifyResult<RegisteredMedicine> {
    let user_id = registration.user_id.trim();
    let name = registration.name.trim();
    if user_id.is_empty() {
        return Err(VerifyError::InvalidInput("user_id is required".into()));
    }
    if name.is_empty() {
        return Err(VerifyError::InvalidInput("medicine name is required".into()));
    }

    let mut medicine = RegisteredMedicine::new(user_id.to_string(), name.to_string());
    medicine.dosage = registration.dosage.filter(|d| !d.trim().is_empty());
    medicine.photo_ref = registration.photo_ref;
    medicine.photo_sha256 = registration.photo_sha256;
    medicine.ocr_text = registration.ocr_text;

    db.insert_medicine(&medicine)?;
    tracing::info!(
        user_id,
        medicine_id = %medicine.medicine_id,
        ocr_chars = medicine.ocr_text.chars().count(),
        "Medicine registered"
    );
    Ok(medicine)
}

/// A dosing-time verification request.
#[derive(Debug, Clone, Default)]
pub struct VerifyRequest {
    pub user_id: String,
    /// Normalized OCR text of the patient photo
    pub patient_ocr_text: String,
    pub photo_ref: Option<String>,
    pub photo_sha256: Option<String>,
    /// Restrict comparison to one medicine
    pub medicine_id: Option<String>,
}

/// Runs verifications against a user's registered medicines.
pub struct Verifier<'a> {
    db: &'a Database,
    scorer: Scorer,
    notifier: Option<&'a NotificationService>,
    fallback_team: CareTeam,
}

impl<'a> Verifier<'a> {
    pub fn new(db: &'a Database, config: MatchConfig) -> Self {
        Self {
            db,
            scorer: Scorer::new(config),
            notifier: None,
            fallback_team: CareTeam::default(),
        }
    }

    /// Notify care teams after each verification.
    ///
    /// `fallback_team` is used for users with no stored contacts.
    pub fn with_notifier(mut self, notifier: &'a NotificationService, fallback_team: CareTeam) -> Self {
        self.notifier = Some(notifier);
        self.fallback_team = fallback_team;
        self
    }

    /// Compare the patient photo text with the user's medicines and record the result.
    pub fn verify(&self, request: VerifyRequest) -> VerifyResult<VerificationOutcome> {
        if request.user_id.trim().is_empty() {
            return Err(VerifyError::InvalidInput("user_id is required".into()));
        }

        let candidates = self.candidates(&request)?;
        if candidates.is_empty() {
            tracing::info!(user_id = %request.user_id, "No registered medicines to verify against");
            return Ok(VerificationOutcome::NoRegisteredMedicines {
                patient_ocr_text: request.patient_ocr_text,
            });
        }

        let results = self.scorer.compare_all(&request.patient_ocr_text, &candidates);
        let best = select_best_by(&results, |c| c.confidence())?.clone();

        let mut record = VerificationRecord::new(
            request.user_id,
            request.patient_ocr_text,
            results,
            best,
        );
        record.photo_ref = request.photo_ref;
        record.photo_sha256 = request.photo_sha256;

        self.db.insert_verification(&record)?;
        tracing::info!(
            user_id = %record.user_id,
            verification_id = %record.verification_id,
            verified = record.verified,
            medicine = %record.best.medicine_name,
            confidence = record.best.result.reported_confidence(),
            "Verification completed"
        );

        // The record is already stored; lookup failures only affect the report
        let notifications = self.notifier.map(|notifier| match self.care_team(&record.user_id) {
            Ok(team) => notifier.notify(&team, &record),
            Err(e) => {
                tracing::warn!(user_id = %record.user_id, error = %e, "Care team lookup failed");
                NotificationReport {
                    errors: vec![format!("Contact lookup failed: {}", e)],
                    ..NotificationReport::default()
                }
            }
        });

        Ok(VerificationOutcome::Completed { record, notifications })
    }

    fn candidates(&self, request: &VerifyRequest) -> VerifyResult<Vec<RegisteredMedicine>> {
        match &request.medicine_id {
            Some(id) => Ok(self
                .db
                .get_medicine(id)?
                .filter(|m| m.user_id == request.user_id)
                .into_iter()
                .collect()),
            None => Ok(self.db.list_medicines_for_user(&request.user_id)?),
        }
    }

    fn care_team(&self, user_id: &str) -> VerifyResult<CareTeam> {
        let team = self.db.care_team(user_id)?;
        if team.is_empty() {
            Ok(self.fallback_team.clone())
        } else {
            Ok(team)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, ContactRole};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (name, ocr) in [
            ("Ibuprofen", ""),
            ("Paracetamol 500mg", "Paracetamol 500mg tablets"),
        ] {
            register_medicine(
                &db,
                MedicineRegistration {
                    user_id: "user-1".into(),
                    name: name.into(),
                    ocr_text: ocr.into(),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        db
    }

    fn request(text: &str) -> VerifyRequest {
        VerifyRequest {
            user_id: "user-1".into(),
            patient_ocr_text: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_validates_input() {
        let db = Database::open_in_memory().unwrap();

        let err = register_medicine(
            &db,
            MedicineRegistration {
                user_id: "user-1".into(),
                name: "  ".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidInput(_)));

        let err = register_medicine(
            &db,
            MedicineRegistration {
                name: "Aspirin".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidInput(_)));
    }

    #[test]
    fn test_verify_selects_best_and_persists() {
        let db = setup();
        let verifier = Verifier::new(&db, MatchConfig::default());

        let outcome = verifier.verify(request("Take PARACETAMOL 500mg twice daily")).unwrap();

        assert!(outcome.verified());
        let record = outcome.record().unwrap();
        assert_eq!(record.results.len(), 2);
        assert_eq!(record.best.medicine_name, "Paracetamol 500mg");
        assert_eq!(record.best.confidence(), 0.95);

        let history = db.list_verifications_for_user("user-1", None).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].verification_id, record.verification_id);
    }

    #[test]
    fn test_no_registered_medicines() {
        let db = Database::open_in_memory().unwrap();
        let verifier = Verifier::new(&db, MatchConfig::default());

        let outcome = verifier.verify(request("Aspirin")).unwrap();

        assert_eq!(
            outcome,
            VerificationOutcome::NoRegisteredMedicines {
                patient_ocr_text: "Aspirin".into()
            }
        );
        assert!(db.list_verifications_for_user("user-1", None).unwrap().is_empty());
    }

    #[test]
    fn test_verify_single_medicine() {
        let db = setup();
        let ibuprofen_id = db.list_medicines_for_user("user-1").unwrap()[0].medicine_id.clone();
        let verifier = Verifier::new(&db, MatchConfig::default());

        let outcome = verifier
            .verify(VerifyRequest {
                medicine_id: Some(ibuprofen_id),
                ..request("Paracetamol 500mg")
            })
            .unwrap();

        let record = outcome.record().unwrap();
        assert_eq!(record.results.len(), 1);
        assert!(!record.verified);

        let foreign = verifier
            .verify(VerifyRequest {
                user_id: "user-2".into(),
                medicine_id: Some(record.best.medicine_id.clone()),
                ..request("Ibuprofen")
            })
            .unwrap();
        assert!(matches!(foreign, VerificationOutcome::NoRegisteredMedicines { .. }));
    }

    #[test]
    fn test_notifier_uses_fallback_team() {
        let db = setup();
        let service = NotificationService::with_channels(None, None, None);
        let fallback = CareTeam {
            doctor: Some(Contact {
                name: "Doctor".into(),
                email: Some("doctor@example.com".into()),
                phone: None,
            }),
            family: Vec::new(),
        };
        let verifier = Verifier::new(&db, MatchConfig::default()).with_notifier(&service, fallback);

        let outcome = verifier.verify(request("Ibuprofen 200mg")).unwrap();
        match outcome {
            VerificationOutcome::Completed { notifications, .. } => {
                let report = notifications.unwrap();
                // Channels are disabled, but the team is not empty
                assert!(report.errors.is_empty());
                assert_eq!(report.total_sent, 0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        db.add_contact(
            "user-1",
            ContactRole::Family,
            &Contact {
                name: "Alex".into(),
                email: None,
                phone: Some("+1555002".into()),
            },
        )
        .unwrap();
        assert_eq!(verifier.care_team("user-1").unwrap().family.len(), 1);
    }

    #[test]
    fn test_contact_lookup_failure_keeps_record() {
        let db = setup();
        let service = NotificationService::with_channels(None, None, None);
        let verifier = Verifier::new(&db, MatchConfig::default()).with_notifier(&service, CareTeam::default());
        db.conn().execute_batch("DROP TABLE care_contacts").unwrap();

        let outcome = verifier.verify(request("Ibuprofen 200mg")).unwrap();

        match outcome {
            VerificationOutcome::Completed { record, notifications } => {
                assert!(record.verified);
                let report = notifications.unwrap();
                assert_eq!(report.total_sent, 0);
                assert_eq!(report.errors.len(), 1);
                assert!(report.errors[0].starts_with("Contact lookup failed"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(db.list_verifications_for_user("user-1", None).unwrap().len(), 1);
    }

    #[test]
    fn test_verify_requires_user() {
        let db = setup();
        let verifier = Verifier::new(&db, MatchConfig::default());
        let result = verifier.verify(VerifyRequest {
            user_id: " ".into(),
            ..request("Ibuprofen")
        });
        assert!(matches!(result, Err(VerifyError::InvalidInput(_))));
    }
}
