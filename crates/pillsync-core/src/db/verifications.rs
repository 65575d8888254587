//! Verification history database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::VerificationRecord;

impl Database {
    /// Append a verification record.
    pub fn insert_verification(&self, record: &VerificationRecord) -> DbResult<()> {
        let results_json = serde_json::to_string(&record.results)?;
        let best_json = serde_json::to_string(&record.best)?;

        self.conn.execute(
            r#"
            INSERT INTO verifications (
                verification_id, user_id, photo_ref, photo_sha256,
                patient_ocr_text, results, best, verified, verified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.verification_id,
                record.user_id,
                record.photo_ref,
                record.photo_sha256,
                record.patient_ocr_text,
                results_json,
                best_json,
                record.verified,
                record.verified_at,
            ],
        )?;
        Ok(())
    }

    /// Get a verification by ID.
    pub fn get_verification(&self, verification_id: &str) -> DbResult<Option<VerificationRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT verification_id, user_id, photo_ref, photo_sha256,
                       patient_ocr_text, results, best, verified, verified_at
                FROM verifications
                WHERE verification_id = ?
                "#,
                [verification_id],
                VerificationRow::from_row,
            )
            .optional()?
            .map(VerificationRecord::try_from)
            .transpose()
    }

    /// List a user's verifications, newest first.
    pub fn list_verifications_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> DbResult<Vec<VerificationRecord>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, |l| l as i64);

        let mut stmt = self.conn.prepare(
            r#"
            SELECT verification_id, user_id, photo_ref, photo_sha256,
                   patient_ocr_text, results, best, verified, verified_at
            FROM verifications
            WHERE user_id = ?
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )?;
        let rows = stmt.query_map(params![user_id, limit], VerificationRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }
}

/// Intermediate row struct for database mapping.
struct VerificationRow {
    verification_id: String,
    user_id: String,
    photo_ref: Option<String>,
    photo_sha256: Option<String>,
    patient_ocr_text: String,
    results: String,
    best: String,
    verified: bool,
    verified_at: String,
}

impl VerificationRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            verification_id: row.get(0)?,
            user_id: row.get(1)?,
            photo_ref: row.get(2)?,
            photo_sha256: row.get(3)?,
            patient_ocr_text: row.get(4)?,
            results: row.get(5)?,
            best: row.get(6)?,
            verified: row.get(7)?,
            verified_at: row.get(8)?,
        })
    }
}

impl TryFrom<VerificationRow> for VerificationRecord {
    type Error = DbError;

    fn try_from(row: VerificationRow) -> Result<Self, Self::Error> {
        Ok(VerificationRecord {
            verification_id: row.verification_id,
            user_id: row.user_id,
            photo_ref: row.photo_ref,
            photo_sha256: row.photo_sha256,
            patient_ocr_text: row.patient_ocr_text,
            results: serde_json::from_str(&row.results)?,
            best: serde_json::from_str(&row.best)?,
            verified: row.verified,
            verified_at: row.verified_at,
        })
    }
}
