//! Registered medicine database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::RegisteredMedicine;

const MEDICINE_COLUMNS: &str =
    "medicine_id, user_id, name, dosage, photo_ref, photo_sha256, ocr_text, registered_at";

impl Database {
    /// Insert a newly registered medicine.
    pub fn insert_medicine(&self, medicine: &RegisteredMedicine) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medicines (
                medicine_id, user_id, name, dosage, photo_ref,
                photo_sha256, ocr_text, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                medicine.medicine_id,
                medicine.user_id,
                medicine.name,
                medicine.dosage,
                medicine.photo_ref,
                medicine.photo_sha256,
                medicine.ocr_text,
                medicine.registered_at,
            ],
        )?;
        Ok(())
    }

    /// Get a medicine by ID.
    pub fn get_medicine(&self, medicine_id: &str) -> DbResult<Option<RegisteredMedicine>> {
        let sql = format!("SELECT {} FROM medicines WHERE medicine_id = ?", MEDICINE_COLUMNS);
        let medicine = self
            .conn
            .query_row(&sql, [medicine_id], medicine_from_row)
            .optional()?;
        Ok(medicine)
    }

    /// List a user's medicines in registration order.
    pub fn list_medicines_for_user(&self, user_id: &str) -> DbResult<Vec<RegisteredMedicine>> {
        let sql = format!(
            "SELECT {} FROM medicines WHERE user_id = ? ORDER BY rowid",
            MEDICINE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], medicine_from_row)?;

        let mut medicines = Vec::new();
        for row in rows {
            medicines.push(row?);
        }
        Ok(medicines)
    }

    /// Delete a medicine. Returns whether a row was removed.
    pub fn delete_medicine(&self, medicine_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medicines WHERE medicine_id = ?", [medicine_id])?;
        Ok(rows_affected > 0)
    }
}

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<RegisteredMedicine> {
    Ok(RegisteredMedicine {
        medicine_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        photo_ref: row.get(4)?,
        photo_sha256: row.get(5)?,
        ocr_text: row.get(6)?,
        registered_at: row.get(7)?,
    })
}
